use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeAttempt {
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub correct: bool,
    pub submitted_at: DateTime<Utc>,
}

impl ChallengeAttempt {
    pub fn new(challenge_id: &str, user_id: &str, correct: bool) -> Self {
        ChallengeAttempt {
            id: Uuid::new_v4().to_string(),
            challenge_id: challenge_id.to_string(),
            user_id: user_id.to_string(),
            answer: None,
            code: None,
            language: None,
            correct,
            submitted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_round_trip_serialization_preserves_verdict() {
        let mut attempt = ChallengeAttempt::new("challenge-1", "user-1", true);
        attempt.answer = Some("B".to_string());

        let json = serde_json::to_string(&attempt).expect("attempt should serialize");
        let parsed: ChallengeAttempt =
            serde_json::from_str(&json).expect("attempt should deserialize");

        assert!(parsed.correct);
        assert_eq!(parsed.answer.as_deref(), Some("B"));
        assert_eq!(parsed.challenge_id, "challenge-1");
    }

    #[test]
    fn attempt_omits_unused_submission_fields() {
        let attempt = ChallengeAttempt::new("challenge-1", "user-1", false);
        let json = serde_json::to_value(&attempt).unwrap();

        assert!(json.get("answer").is_none());
        assert!(json.get("code").is_none());
        assert_eq!(json["correct"], false);
    }
}
