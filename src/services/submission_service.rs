use std::collections::HashMap;
use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::test::{Test, TestKind},
    models::domain::test_result::{SubmittedAnswer, TestResult},
    models::dto::request::SubmitTestRequest,
    models::dto::response::{
        ResultWithTestDto, ResultWithUserDto, SubmitTestResponse, TestSummaryDto, UserSummaryDto,
    },
    repositories::{ResultRepository, TestRepository, UserRepository},
    services::RewardService,
};

/// Takes a learner's answer sheet through validation, scoring, persistence
/// and the reward side effect, in that order.
pub struct SubmissionService {
    test_repository: Arc<dyn TestRepository>,
    result_repository: Arc<dyn ResultRepository>,
    user_repository: Arc<dyn UserRepository>,
    reward_service: Arc<RewardService>,
    allow_resubmission: bool,
}

impl SubmissionService {
    pub fn new(
        test_repository: Arc<dyn TestRepository>,
        result_repository: Arc<dyn ResultRepository>,
        user_repository: Arc<dyn UserRepository>,
        reward_service: Arc<RewardService>,
        allow_resubmission: bool,
    ) -> Self {
        Self {
            test_repository,
            result_repository,
            user_repository,
            reward_service,
            allow_resubmission,
        }
    }

    /// Score and persist one submission. The reward write runs after the
    /// result is committed and never fails the request.
    pub async fn submit(
        &self,
        test_id: &str,
        user_id: &str,
        request: SubmitTestRequest,
    ) -> AppResult<SubmitTestResponse> {
        request.validate()?;

        let test = self
            .test_repository
            .find_by_id(test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", test_id)))?;

        if !self.allow_resubmission {
            let existing = self
                .result_repository
                .find_by_test_and_user(test_id, user_id)
                .await?;
            if existing.is_some() {
                return Err(AppError::AlreadyExists(
                    "Test has already been submitted".to_string(),
                ));
            }
        }

        let score = score_answers(&test, &request.answers);
        let total = test.questions.len() as i32;
        let penalty = request.penalty.unwrap_or(0.0);

        let result = TestResult::new(
            test_id,
            user_id,
            request.answers,
            score,
            total,
            penalty,
            request.proctoring_log,
        );
        let result = self.result_repository.create(result).await?;

        let percent = if total > 0 {
            f64::from(score) * 100.0 / f64::from(total)
        } else {
            0.0
        };

        if let Err(e) = self
            .reward_service
            .award_for_submission(user_id, percent)
            .await
        {
            log::warn!(
                "Reward update failed for user '{}' on test '{}': {}",
                user_id,
                test_id,
                e
            );
        }

        log::info!(
            "User '{}' submitted test '{}': {}/{}",
            user_id,
            test_id,
            score,
            total
        );

        Ok(SubmitTestResponse {
            result_id: result.id,
            score,
            total,
            final_score: result.final_score,
        })
    }

    /// The caller's own result for a test.
    pub async fn my_result(&self, test_id: &str, user_id: &str) -> AppResult<TestResult> {
        self.result_repository
            .find_by_test_and_user(test_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No result found for this test".to_string()))
    }

    /// All results for a test the requester created, with the submitting
    /// users attached.
    pub async fn results_for_test(
        &self,
        test_id: &str,
        requester_id: &str,
    ) -> AppResult<Vec<ResultWithUserDto>> {
        let test = self
            .test_repository
            .find_by_id(test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", test_id)))?;

        if test.created_by != requester_id {
            return Err(AppError::Unauthorized(
                "You can only view results for your own tests".to_string(),
            ));
        }

        let results = self.result_repository.find_by_test(test_id).await?;

        let user_ids: Vec<ObjectId> = results
            .iter()
            .filter_map(|result| ObjectId::parse_str(&result.user_id).ok())
            .collect();
        let users = self.user_repository.find_by_ids(&user_ids).await?;

        let users_by_id: HashMap<String, UserSummaryDto> = users
            .into_iter()
            .filter_map(|user| {
                user.id.map(|oid| {
                    (
                        oid.to_hex(),
                        UserSummaryDto {
                            username: user.username,
                            email: user.email,
                        },
                    )
                })
            })
            .collect();

        Ok(results
            .into_iter()
            .map(|result| {
                let user = users_by_id.get(&result.user_id).cloned();
                ResultWithUserDto { result, user }
            })
            .collect())
    }

    /// The caller's whole result history, newest first, with a short test
    /// summary attached where the test still exists.
    pub async fn my_results(&self, user_id: &str) -> AppResult<Vec<ResultWithTestDto>> {
        let results = self.result_repository.find_by_user(user_id).await?;

        let mut tests: HashMap<String, TestSummaryDto> = HashMap::new();
        for result in &results {
            if tests.contains_key(&result.test_id) {
                continue;
            }
            if let Some(test) = self.test_repository.find_by_id(&result.test_id).await? {
                tests.insert(result.test_id.clone(), TestSummaryDto::from(&test));
            }
        }

        Ok(results
            .into_iter()
            .map(|result| {
                let test = tests.get(&result.test_id).cloned();
                ResultWithTestDto { result, test }
            })
            .collect())
    }
}

/// Count exact answer matches. Duplicate indices resolve to the last
/// submitted value; comparison is case-sensitive with no trimming. Coding
/// submissions are stored verbatim and score zero here.
fn score_answers(test: &Test, answers: &[SubmittedAnswer]) -> i32 {
    if test.kind == TestKind::Coding {
        return 0;
    }

    let mut latest: HashMap<i32, &SubmittedAnswer> = HashMap::new();
    for answer in answers {
        latest.insert(answer.index, answer);
    }

    let mut score = 0;
    for (index, question) in test.questions.iter().enumerate() {
        let submitted = latest
            .get(&(index as i32))
            .and_then(|entry| entry.answer.as_deref());

        if submitted == Some(question.correct_answer.as_str()) {
            score += 1;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::test::Question;

    fn mcq(correct: &str) -> Question {
        Question {
            question: "q".to_string(),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_answer: correct.to_string(),
            starter_code: None,
            language: None,
            test_cases: None,
        }
    }

    fn answer(index: i32, value: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            index,
            answer: Some(value.to_string()),
            code: None,
            language: None,
        }
    }

    fn mcq_test(correct: &[&str]) -> Test {
        let questions = correct.iter().map(|c| mcq(c)).collect();
        Test::new(
            "Sample",
            "Maths",
            "Easy",
            TestKind::Mcq,
            questions,
            "ABC234",
            "admin-1",
        )
    }

    #[test]
    fn test_score_counts_exact_matches() {
        let test = mcq_test(&["A", "B", "C"]);
        let answers = vec![answer(0, "A"), answer(1, "X"), answer(2, "C")];

        assert_eq!(score_answers(&test, &answers), 2);
    }

    #[test]
    fn test_score_is_independent_of_answer_order() {
        let test = mcq_test(&["A", "B", "C"]);
        let answers = vec![answer(2, "C"), answer(0, "A"), answer(1, "B")];

        assert_eq!(score_answers(&test, &answers), 3);
    }

    #[test]
    fn test_duplicate_index_keeps_last_value() {
        let test = mcq_test(&["A"]);
        let answers = vec![answer(0, "A"), answer(0, "B")];

        assert_eq!(score_answers(&test, &answers), 0);

        let answers = vec![answer(0, "B"), answer(0, "A")];
        assert_eq!(score_answers(&test, &answers), 1);
    }

    #[test]
    fn test_missing_and_out_of_range_answers_do_not_score() {
        let test = mcq_test(&["A", "B"]);
        let answers = vec![answer(1, "B"), answer(7, "A"), answer(-1, "A")];

        assert_eq!(score_answers(&test, &answers), 1);
    }

    #[test]
    fn test_comparison_is_case_sensitive_without_trimming() {
        let test = mcq_test(&["A", "B"]);
        let answers = vec![answer(0, "a"), answer(1, " B")];

        assert_eq!(score_answers(&test, &answers), 0);
    }

    #[test]
    fn test_coding_submissions_score_zero() {
        let mut test = mcq_test(&["print(1)"]);
        test.kind = TestKind::Coding;
        let answers = vec![answer(0, "print(1)")];

        assert_eq!(score_answers(&test, &answers), 0);
    }

    #[test]
    fn test_unanswered_question_with_empty_key_does_not_score() {
        let test = mcq_test(&[""]);

        assert_eq!(score_answers(&test, &[]), 0);
    }
}
