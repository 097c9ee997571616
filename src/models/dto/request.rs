use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::challenge::ChallengeKind;
use crate::models::domain::test::{Question, TestCase, TestKind};
use crate::models::domain::test_result::{ProctoringEvent, SubmittedAnswer};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub subject: String,

    #[validate(length(min = 1, max = 50))]
    pub difficulty: String,

    #[serde(rename = "type")]
    pub kind: TestKind,

    #[validate(length(min = 1, message = "At least one question is required"))]
    pub questions: Vec<Question>,
}

/// Question shape the generator model is asked to produce. Also accepted
/// back verbatim when an admin saves a generated test.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAiTestRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub subject: String,

    #[validate(length(min = 1, max = 50))]
    pub difficulty: String,

    #[validate(length(min = 1, message = "At least one question is required"))]
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestRequest {
    pub answers: Vec<SubmittedAnswer>,

    pub penalty: Option<f64>,

    pub proctoring_log: Option<Vec<ProctoringEvent>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(rename = "type")]
    pub kind: ChallengeKind,

    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    #[serde(default)]
    pub options: Vec<String>,

    pub correct_answer: Option<String>,

    pub subject: Option<String>,

    pub active_from: DateTime<Utc>,

    pub starter_code: Option<String>,

    pub language: Option<String>,

    pub test_cases: Option<Vec<TestCase>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttemptChallengeRequest {
    pub answer: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,

    #[validate(length(min = 1, max = 50))]
    pub difficulty: String,

    #[validate(range(min = 1, message = "Invalid number of questions"))]
    pub number_of_questions: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RunCodeRequest {
    #[validate(range(min = 0))]
    pub question_index: i32,

    #[validate(length(min = 1, message = "Source code must not be empty"))]
    pub code: String,

    #[validate(length(min = 1))]
    pub language: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_valid_register_request() {
        let request = RegisterRequest {
            username: "johndoe".to_string(),
            email: "john@example.com".to_string(),
            password: "secret99".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_invalid_email() {
        let request = RegisterRequest {
            username: "johndoe".to_string(),
            email: "invalid-email".to_string(),
            password: "secret99".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_password_too_short() {
        let request = RegisterRequest {
            username: "johndoe".to_string(),
            email: "john@example.com".to_string(),
            password: "abc".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_test_requires_questions() {
        let request = CreateTestRequest {
            name: "Midterm".to_string(),
            subject: "Algebra".to_string(),
            difficulty: "easy".to_string(),
            kind: TestKind::Mcq,
            questions: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_generate_questions_rejects_non_positive_count() {
        let request = GenerateQuestionsRequest {
            subject: "History".to_string(),
            difficulty: "hard".to_string(),
            number_of_questions: 0,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_submit_request_deserializes_mixed_answers() {
        let json = r#"{
            "answers": [
                {"index": 0, "answer": "A"},
                {"index": 1, "code": "print(1)", "language": "python"}
            ],
            "penalty": 1.5,
            "proctoringLog": [{"ts": 1700000000000, "msg": "tab switch"}]
        }"#;

        let request: SubmitTestRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.answers.len(), 2);
        assert_eq!(request.penalty, Some(1.5));
        assert_eq!(request.answers[1].code.as_deref(), Some("print(1)"));
    }

    #[test]
    fn test_generated_question_schema_lists_contract_fields() {
        let schema = schemars::schema_for!(GeneratedQuestion);
        let json = serde_json::to_value(&schema).unwrap();
        let properties = json["properties"].as_object().unwrap();

        assert!(properties.contains_key("question"));
        assert!(properties.contains_key("options"));
        assert!(properties.contains_key("correctAnswer"));
    }

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_pagination_limit_capped() {
        let params = PaginationParams {
            offset: Some(0),
            limit: Some(500),
        };
        assert_eq!(params.limit(), 100);
    }
}
