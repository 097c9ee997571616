use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, AppResult},
    models::domain::test::TestCase,
    models::domain::test_result::CaseOutcome,
};

/// Judge0 status id for an accepted run.
const ACCEPTED_STATUS: i32 = 3;

/// Runs one piece of source code against one test case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeJudge: Send + Sync {
    async fn run(
        &self,
        source: &str,
        language: &str,
        test_case: &TestCase,
    ) -> AppResult<CaseOutcome>;
}

/// HTTP adapter for a Judge0-style execution API. Works against both the
/// hosted RapidAPI deployment (key set) and a self-hosted instance (no key).
pub struct Judge0Client {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl Judge0Client {
    pub fn new(base_url: &str, api_key: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct JudgeSubmission<'a> {
    source_code: &'a str,
    language_id: i32,
    stdin: &'a str,
    expected_output: &'a str,
}

#[derive(Debug, Deserialize)]
struct JudgeStatus {
    id: i32,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct JudgeResponse {
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    memory: Option<i64>,
    status: JudgeStatus,
}

#[async_trait]
impl CodeJudge for Judge0Client {
    async fn run(
        &self,
        source: &str,
        language: &str,
        test_case: &TestCase,
    ) -> AppResult<CaseOutcome> {
        let language_id = language_id(language)?;

        let url = format!("{}/submissions?base64_encoded=false&wait=true", self.base_url);
        let mut request = self.client.post(&url).json(&JudgeSubmission {
            source_code: source,
            language_id,
            stdin: &test_case.input,
            expected_output: &test_case.expected_output,
        });

        if let Some(key) = &self.api_key {
            request = request.header("X-RapidAPI-Key", key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Code judge request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| String::new());
            log::error!("Code judge returned {}: {}", status, body);
            return Err(AppError::UpstreamError(format!(
                "Code judge returned status {}",
                status
            )));
        }

        let judged: JudgeResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Invalid code judge response: {}", e)))?;

        let passed = judged.status.id == ACCEPTED_STATUS;
        if !passed {
            log::debug!(
                "Judge status {} ({}) for stdin {:?}",
                judged.status.id,
                judged.status.description,
                test_case.input
            );
        }

        Ok(CaseOutcome {
            input: test_case.input.clone(),
            expected_output: test_case.expected_output.clone(),
            passed,
            stdout: judged.stdout,
            time: judged.time,
            memory: judged.memory,
        })
    }
}

fn language_id(language: &str) -> AppResult<i32> {
    match language.to_lowercase().as_str() {
        "python" | "python3" => Ok(71),
        "javascript" | "js" => Ok(63),
        "cpp" | "c++" => Ok(53),
        "java" => Ok(62),
        other => Err(AppError::ValidationError(format!(
            "Unsupported language '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn sample_case() -> TestCase {
        TestCase {
            input: "1 2".to_string(),
            expected_output: "3".to_string(),
            is_public: true,
        }
    }

    #[test]
    fn test_language_ids_cover_supported_languages() {
        assert_eq!(language_id("python").unwrap(), 71);
        assert_eq!(language_id("PYTHON3").unwrap(), 71);
        assert_eq!(language_id("javascript").unwrap(), 63);
        assert_eq!(language_id("c++").unwrap(), 53);
        assert_eq!(language_id("java").unwrap(), 62);
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let err = language_id("cobol").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_accepted_run_maps_to_passed_outcome() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/submissions"))
            .and(query_param("wait", "true"))
            .and(body_partial_json(json!({
                "source_code": "print(3)",
                "language_id": 71,
                "stdin": "1 2",
                "expected_output": "3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stdout": "3\n",
                "time": "0.012",
                "memory": 3180,
                "status": { "id": 3, "description": "Accepted" }
            })))
            .mount(&server)
            .await;

        let client = Judge0Client::new(&server.uri(), None);
        let outcome = client.run("print(3)", "python", &sample_case()).await.unwrap();

        assert!(outcome.passed);
        assert_eq!(outcome.stdout.as_deref(), Some("3\n"));
        assert_eq!(outcome.expected_output, "3");
        assert_eq!(outcome.memory, Some(3180));
    }

    #[tokio::test]
    async fn test_wrong_answer_maps_to_failed_outcome() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/submissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stdout": "4\n",
                "status": { "id": 4, "description": "Wrong Answer" }
            })))
            .mount(&server)
            .await;

        let client = Judge0Client::new(&server.uri(), None);
        let outcome = client.run("print(4)", "python", &sample_case()).await.unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.stdout.as_deref(), Some("4\n"));
        assert!(outcome.time.is_none());
    }

    #[tokio::test]
    async fn test_http_error_surfaces_as_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/submissions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = Judge0Client::new(&server.uri(), None);
        let err = client
            .run("print(3)", "python", &sample_case())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_api_key_is_sent_when_configured() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/submissions"))
            .and(wiremock::matchers::header("X-RapidAPI-Key", "k-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": { "id": 3 }
            })))
            .mount(&server)
            .await;

        let client = Judge0Client::new(&server.uri(), Some(SecretString::from("k-123".to_string())));
        let outcome = client.run("print(3)", "python", &sample_case()).await.unwrap();

        assert!(outcome.passed);
    }
}
