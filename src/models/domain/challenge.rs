use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::test::TestCase;

/// A daily challenge. At most one is expected per calendar day,
/// selected by the `active_from` timestamp falling inside the day.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub active_from: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Question,
    Coding,
}

impl Challenge {
    pub fn new(kind: ChallengeKind, question: &str, active_from: DateTime<Utc>) -> Self {
        Challenge {
            id: Uuid::new_v4().to_string(),
            kind,
            question: question.to_string(),
            options: Vec::new(),
            correct_answer: String::new(),
            subject: None,
            active_from,
            starter_code: None,
            language: None,
            test_cases: None,
            created_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_challenge_has_empty_answer_fields() {
        let challenge = Challenge::new(ChallengeKind::Question, "What is 2+2?", Utc::now());

        assert_eq!(challenge.question, "What is 2+2?");
        assert!(challenge.correct_answer.is_empty());
        assert!(challenge.starter_code.is_none());
    }

    #[test]
    fn challenge_kind_serializes_lowercase() {
        let challenge = Challenge::new(ChallengeKind::Coding, "Reverse a string", Utc::now());
        let json = serde_json::to_value(&challenge).unwrap();

        assert_eq!(json["type"], "coding");
        assert_eq!(json["correctAnswer"], "");
        assert!(json.get("starterCode").is_none());
    }
}
