use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one submission. Auto-marked fields are set on insert;
/// coding_detail and descriptive_feedback are attached later by the
/// evaluation pipeline.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub test_id: String,
    pub user_id: String,
    pub answers: Vec<SubmittedAnswer>,
    pub score: i32,
    pub total: i32,
    pub penalty: f64,
    pub final_score: f64,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proctoring_log: Option<Vec<ProctoringEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding_detail: Option<Vec<QuestionJudgeDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptive_feedback: Option<Vec<AnswerFeedback>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Client-side proctoring event, ts is epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProctoringEvent {
    pub ts: i64,
    pub msg: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionJudgeDetail {
    pub index: i32,
    pub results: Vec<CaseOutcome>,
}

/// Per test case judge verdict. `expected_output` carries the case's
/// expected value, the program's actual output lands in `stdout`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOutcome {
    pub input: String,
    #[serde(rename = "output")]
    pub expected_output: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub index: i32,
    pub marks: f64,
    pub max: f64,
    pub feedback: String,
}

impl TestResult {
    pub fn new(
        test_id: &str,
        user_id: &str,
        answers: Vec<SubmittedAnswer>,
        score: i32,
        total: i32,
        penalty: f64,
        proctoring_log: Option<Vec<ProctoringEvent>>,
    ) -> Self {
        TestResult {
            id: Uuid::new_v4().to_string(),
            test_id: test_id.to_string(),
            user_id: user_id.to_string(),
            answers,
            score,
            total,
            penalty,
            final_score: f64::from(score) - penalty,
            submitted_at: Utc::now(),
            proctoring_log,
            coding_detail: None,
            descriptive_feedback: None,
        }
    }
}
