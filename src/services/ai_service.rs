use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::ExposeSecret;
use serde::Deserialize;
use validator::Validate;

use crate::{
    config::Config,
    constants::prompts::{
        GRADING_FAILURE_FEEDBACK, GRADING_SYSTEM_PROMPT, MCQ_GENERATION_SYSTEM_PROMPT,
    },
    errors::{AppError, AppResult},
    models::domain::test_result::AnswerFeedback,
    models::dto::request::{GenerateQuestionsRequest, GeneratedQuestion},
    models::dto::response::GenerateQuestionsResponse,
};

const GENERATION_TEMPERATURE: f32 = 0.6;
const GRADING_TEMPERATURE: f32 = 0.1;
const MAX_MARKS: f64 = 10.0;

static SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]+(?:\.[0-9]+)?)\s*/\s*[0-9]+")
        .expect("SCORE_RE is a valid regex pattern")
});

/// Adapter over an OpenAI-compatible chat completions API. Authors MCQ
/// batches for admins and grades free-text answers during evaluation.
pub struct AiService {
    client: Client<OpenAIConfig>,
    model: String,
}

impl AiService {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::default()
            .with_api_base(&config.ai_api_base)
            .with_api_key(config.ai_api_key.expose_secret());

        Self {
            client: Client::with_config(openai_config),
            model: config.ai_model.clone(),
        }
    }

    /// Ask the model for a batch of multiple-choice questions. The model's
    /// `answer` field is normalized to `correctAnswer` on the way out.
    pub async fn generate_questions(
        &self,
        request: GenerateQuestionsRequest,
    ) -> AppResult<GenerateQuestionsResponse> {
        request.validate()?;

        let user_prompt = format!(
            "Generate {} {} level multiple-choice questions on {}.\n\
             Output MUST be a pure JSON array:\n\
             [\n  {{\n    \"question\": \"...\",\n    \"options\": [\"A\",\"B\",\"C\",\"D\"],\n    \"answer\": \"A\"\n  }}\n]",
            request.number_of_questions, request.difficulty, request.subject
        );

        let content = self
            .chat(
                MCQ_GENERATION_SYSTEM_PROMPT.to_string(),
                user_prompt,
                GENERATION_TEMPERATURE,
            )
            .await?;

        let raw = strip_code_fences(&content);
        let questions = parse_generated(raw).map_err(|e| {
            log::error!("AI returned unparseable questions: {} | {}", e, raw);
            AppError::UpstreamError(format!("AI returned invalid JSON: {}", raw))
        })?;

        log::info!(
            "Generated {} questions on '{}'",
            questions.len(),
            request.subject
        );

        Ok(GenerateQuestionsResponse { questions })
    }

    /// Grade one free-text answer out of ten. Grading never fails the
    /// evaluation: any upstream problem yields zero marks with a fixed
    /// failure note.
    pub async fn grade_answer(&self, question: &str, answer: &str) -> AnswerFeedback {
        let user_prompt = format!(
            "Question: {}\nAnswer: {}\nProvide:\nScore: <marks>/{}\nFeedback: <short feedback>",
            question, answer, MAX_MARKS
        );

        match self
            .chat(
                GRADING_SYSTEM_PROMPT.to_string(),
                user_prompt,
                GRADING_TEMPERATURE,
            )
            .await
        {
            Ok(content) => {
                let (marks, feedback) = parse_grade(&content);
                AnswerFeedback {
                    index: 0,
                    marks,
                    max: MAX_MARKS,
                    feedback,
                }
            }
            Err(e) => {
                log::warn!("AI grading failed: {}", e);
                AnswerFeedback {
                    index: 0,
                    marks: 0.0,
                    max: MAX_MARKS,
                    feedback: GRADING_FAILURE_FEEDBACK.to_string(),
                }
            }
        }
    }

    async fn chat(
        &self,
        system_prompt: String,
        user_prompt: String,
        temperature: f32,
    ) -> AppResult<String> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(system_prompt),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(user_prompt),
                name: None,
            }),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(temperature)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build AI request: {}", e)))?;

        let completion = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::UpstreamError(format!("AI request failed: {}", e)))?;

        let content = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AppError::UpstreamError("No output from AI".to_string()));
        }

        Ok(content)
    }
}

#[derive(Debug, Deserialize)]
struct RawGeneratedQuestion {
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default, rename = "correctAnswer")]
    correct_answer: Option<String>,
}

/// Models often wrap JSON in a markdown fence despite the instructions.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    body.trim_end().trim_end_matches("```").trim()
}

fn parse_generated(raw: &str) -> Result<Vec<GeneratedQuestion>, serde_json::Error> {
    let parsed: Vec<RawGeneratedQuestion> = serde_json::from_str(raw)?;

    Ok(parsed
        .into_iter()
        .map(|entry| GeneratedQuestion {
            question: entry.question,
            options: entry.options,
            correct_answer: entry.answer.or(entry.correct_answer).unwrap_or_default(),
        })
        .collect())
}

/// Pull "Score: m/max" and the feedback text out of a grading reply.
fn parse_grade(content: &str) -> (f64, String) {
    let marks = SCORE_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);

    let feedback = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("Score:"))
        .map(|line| line.trim_start_matches("Feedback:").trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (marks, feedback)
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn service_against(server: &MockServer) -> AiService {
        let mut config = Config::test_config();
        config.ai_api_base = format!("{}/v1", server.uri());
        config.ai_api_key = SecretString::from("test-key".to_string());
        AiService::new(&config)
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "openai/gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop",
                "logprobs": null
            }]
        })
    }

    #[test]
    fn test_strip_code_fences_handles_plain_and_fenced_json() {
        assert_eq!(strip_code_fences("[1]"), "[1]");
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  [1]  "), "[1]");
    }

    #[test]
    fn test_parse_generated_normalizes_answer_field() {
        let questions =
            parse_generated(r#"[{"question":"Q","options":["A","B"],"answer":"B"}]"#).unwrap();
        assert_eq!(questions[0].correct_answer, "B");

        let questions =
            parse_generated(r#"[{"question":"Q","options":[],"correctAnswer":"A"}]"#).unwrap();
        assert_eq!(questions[0].correct_answer, "A");
    }

    #[test]
    fn test_parse_grade_reads_score_and_feedback() {
        let (marks, feedback) = parse_grade("Score: 7.5/10\nFeedback: Decent coverage.");

        assert_eq!(marks, 7.5);
        assert_eq!(feedback, "Decent coverage.");
    }

    #[test]
    fn test_parse_grade_defaults_to_zero_without_score_line() {
        let (marks, feedback) = parse_grade("The answer is incomplete.");

        assert_eq!(marks, 0.0);
        assert_eq!(feedback, "The answer is incomplete.");
    }

    #[tokio::test]
    async fn test_generate_questions_parses_fenced_output() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({ "temperature": 0.6 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                "```json\n[{\"question\":\"2+2?\",\"options\":[\"3\",\"4\"],\"answer\":\"4\"}]\n```",
            )))
            .mount(&server)
            .await;

        let service = service_against(&server);
        let response = service
            .generate_questions(GenerateQuestionsRequest {
                subject: "Maths".to_string(),
                difficulty: "Easy".to_string(),
                number_of_questions: 1,
            })
            .await
            .unwrap();

        assert_eq!(response.questions.len(), 1);
        assert_eq!(response.questions[0].correct_answer, "4");
    }

    #[tokio::test]
    async fn test_generate_questions_rejects_invalid_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("not json at all")),
            )
            .mount(&server)
            .await;

        let service = service_against(&server);
        let err = service
            .generate_questions(GenerateQuestionsRequest {
                subject: "Maths".to_string(),
                difficulty: "Easy".to_string(),
                number_of_questions: 1,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_grade_answer_parses_marks() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                "Score: 8/10\nFeedback: Good grasp of the topic.",
            )))
            .mount(&server)
            .await;

        let service = service_against(&server);
        let feedback = service.grade_answer("Explain TCP.", "It is reliable.").await;

        assert_eq!(feedback.marks, 8.0);
        assert_eq!(feedback.max, 10.0);
        assert_eq!(feedback.feedback, "Good grasp of the topic.");
    }

    #[tokio::test]
    async fn test_grade_answer_swallows_upstream_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = service_against(&server);
        let feedback = service.grade_answer("Explain TCP.", "It is reliable.").await;

        assert_eq!(feedback.marks, 0.0);
        assert_eq!(feedback.feedback, GRADING_FAILURE_FEEDBACK);
    }
}
