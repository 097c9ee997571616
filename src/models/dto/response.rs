use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::test::{Test, TestCase, TestKind};
use crate::models::domain::test_result::{CaseOutcome, TestResult};
use crate::models::domain::user::{User, UserRole};
use crate::models::dto::request::GeneratedQuestion;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub xp: i64,
    pub badges: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user
                .id
                .map(|oid| oid.to_hex())
                .unwrap_or_else(|| user.username.clone()),
            username: user.username,
            email: user.email,
            role: user.role,
            xp: user.xp,
            badges: user.badges,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestResponse {
    pub result_id: String,
    pub score: i32,
    pub total: i32,
    pub final_score: f64,
}

/// Test as exposed to takers who joined by code. Answer keys are
/// stripped, coding questions carry public test cases only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTestDto {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub difficulty: String,
    #[serde(rename = "type")]
    pub kind: TestKind,
    pub questions: Vec<PublicQuestionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestionDto {
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
}

impl From<Test> for PublicTestDto {
    fn from(test: Test) -> Self {
        let coding = test.kind == TestKind::Coding;
        let questions = test
            .questions
            .into_iter()
            .map(|q| {
                if coding {
                    PublicQuestionDto {
                        question: q.question,
                        options: q.options,
                        starter_code: q.starter_code,
                        language: q.language,
                        test_cases: q.test_cases.map(|cases| {
                            cases.into_iter().filter(|c| c.is_public).collect()
                        }),
                    }
                } else {
                    PublicQuestionDto {
                        question: q.question,
                        options: q.options,
                        starter_code: None,
                        language: None,
                        test_cases: None,
                    }
                }
            })
            .collect();

        PublicTestDto {
            id: test.id,
            name: test.name,
            subject: test.subject,
            difficulty: test.difficulty,
            kind: test.kind,
            questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAiTestResponse {
    pub message: String,
    pub code: String,
    pub test: Test,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptChallengeResponse {
    pub correct: bool,
    pub attempt_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuestionsResponse {
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCodeResponse {
    pub results: Vec<CaseOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestsResponse {
    pub tests: Vec<Test>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummaryDto {
    pub name: String,
    pub subject: String,
    pub difficulty: String,
}

impl From<&Test> for TestSummaryDto {
    fn from(test: &Test) -> Self {
        TestSummaryDto {
            name: test.name.clone(),
            subject: test.subject.clone(),
            difficulty: test.difficulty.clone(),
        }
    }
}

/// A result enriched with a summary of the test it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultWithTestDto {
    #[serde(flatten)]
    pub result: TestResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<TestSummaryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummaryDto {
    pub username: String,
    pub email: String,
}

/// A result enriched with the submitting user, for the admin view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultWithUserDto {
    #[serde(flatten)]
    pub result: TestResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummaryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntryDto {
    pub username: String,
    pub xp: i64,
    pub badges: Vec<String>,
}

impl From<User> for LeaderboardEntryDto {
    fn from(user: User) -> Self {
        LeaderboardEntryDto {
            username: user.username,
            xp: user.xp,
            badges: user.badges,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserDto,
    pub attempts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub attempts: i64,
    pub average_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub subject: String,
    pub attempts: i64,
    pub average_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub overall: OverallStats,
    pub subjects: Vec<SubjectStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::test::Question;

    fn coding_question() -> Question {
        Question {
            question: "Sum two numbers".to_string(),
            options: vec![],
            correct_answer: String::new(),
            starter_code: Some("def solve():".to_string()),
            language: Some("python".to_string()),
            test_cases: Some(vec![
                TestCase {
                    input: "1 2".to_string(),
                    expected_output: "3".to_string(),
                    is_public: true,
                },
                TestCase {
                    input: "10 20".to_string(),
                    expected_output: "30".to_string(),
                    is_public: false,
                },
            ]),
        }
    }

    fn mcq_question() -> Question {
        Question {
            question: "2+2?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            correct_answer: "4".to_string(),
            starter_code: None,
            language: None,
            test_cases: None,
        }
    }

    #[test]
    fn test_public_dto_strips_answer_key_from_mcq() {
        let test = Test::new(
            "Midterm",
            "Algebra",
            "easy",
            TestKind::Mcq,
            vec![mcq_question()],
            "ABC234",
            "teacher-1",
        );

        let dto = PublicTestDto::from(test);
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["questions"][0]["question"], "2+2?");
        assert!(json["questions"][0].get("correctAnswer").is_none());
        assert!(json["questions"][0].get("testCases").is_none());
    }

    #[test]
    fn test_public_dto_keeps_only_public_cases_for_coding() {
        let test = Test::new(
            "Lab",
            "Programming",
            "medium",
            TestKind::Coding,
            vec![coding_question()],
            "XYZ789",
            "teacher-1",
        );

        let dto = PublicTestDto::from(test);
        let cases = dto.questions[0].test_cases.as_ref().unwrap();

        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].input, "1 2");
        assert_eq!(
            dto.questions[0].starter_code.as_deref(),
            Some("def solve():")
        );
    }

    #[test]
    fn test_user_dto_falls_back_to_username_without_object_id() {
        let user = User::test_user("johndoe", "john@example.com");
        let dto = UserDto::from(user);

        assert_eq!(dto.id, "johndoe");
        assert_eq!(dto.xp, 0);
    }
}
