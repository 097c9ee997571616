use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A published assessment. Questions are embedded so a single fetch by
/// join code returns everything a client needs to render the test.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub difficulty: String,
    #[serde(rename = "type")]
    pub kind: TestKind,
    pub questions: Vec<Question>,
    pub code: String, // join code, unique per test
    pub created_by: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Mcq,
    Ai,
    Coding,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    #[serde(rename = "output")]
    pub expected_output: String,
    #[serde(default)]
    pub is_public: bool,
}

impl Test {
    pub fn new(
        name: &str,
        subject: &str,
        difficulty: &str,
        kind: TestKind,
        questions: Vec<Question>,
        code: &str,
        created_by: &str,
    ) -> Self {
        Test {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            subject: subject.to_string(),
            difficulty: difficulty.to_string(),
            kind,
            questions,
            code: code.to_string(),
            created_by: created_by.to_string(),
            is_active: true,
            created_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mcq_question(prompt: &str, correct: &str) -> Question {
        Question {
            question: prompt.to_string(),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_answer: correct.to_string(),
            starter_code: None,
            language: None,
            test_cases: None,
        }
    }

    #[test]
    fn new_test_is_active_with_generated_id() {
        let test = Test::new(
            "Midterm",
            "Algebra",
            "medium",
            TestKind::Mcq,
            vec![make_mcq_question("1+1?", "2")],
            "ABC234",
            "teacher-1",
        );

        assert!(test.is_active);
        assert!(!test.id.is_empty());
        assert_eq!(test.code, "ABC234");
        assert!(test.created_at.is_some());
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let test = Test::new(
            "Midterm",
            "Algebra",
            "easy",
            TestKind::Coding,
            vec![],
            "ABC234",
            "teacher-1",
        );

        let json = serde_json::to_value(&test).expect("test should serialize");
        assert_eq!(json["type"], "coding");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["createdBy"], "teacher-1");
    }

    #[test]
    fn question_deserializes_without_optional_fields() {
        let json = r#"{"question": "What is Rust?", "options": [], "correctAnswer": "A language"}"#;
        let question: Question = serde_json::from_str(json).expect("question should deserialize");

        assert_eq!(question.correct_answer, "A language");
        assert!(question.test_cases.is_none());
    }

    #[test]
    fn test_case_round_trip_keeps_expected_output_under_output_key() {
        let case = TestCase {
            input: "3 4".to_string(),
            expected_output: "7".to_string(),
            is_public: true,
        };

        let json = serde_json::to_value(&case).expect("case should serialize");
        assert_eq!(json["output"], "7");
        assert_eq!(json["isPublic"], true);

        let parsed: TestCase = serde_json::from_value(json).expect("case should deserialize");
        assert_eq!(parsed, case);
    }
}
