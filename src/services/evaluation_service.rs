use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::test::{Test, TestCase, TestKind},
    models::domain::test_result::{CaseOutcome, QuestionJudgeDetail, TestResult},
    models::dto::request::RunCodeRequest,
    models::dto::response::RunCodeResponse,
    repositories::{ResultRepository, TestRepository},
    services::{AiService, CodeJudge},
};

/// Drives the code judge and the grading collaborator against stored
/// submissions. Judge calls fan out with bounded concurrency and a
/// per-call timeout; outcomes come back in test-case order.
pub struct EvaluationService {
    test_repository: Arc<dyn TestRepository>,
    result_repository: Arc<dyn ResultRepository>,
    judge: Arc<dyn CodeJudge>,
    ai_service: Arc<AiService>,
    concurrency: usize,
    timeout: Duration,
}

impl EvaluationService {
    pub fn new(
        test_repository: Arc<dyn TestRepository>,
        result_repository: Arc<dyn ResultRepository>,
        judge: Arc<dyn CodeJudge>,
        ai_service: Arc<AiService>,
        concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            test_repository,
            result_repository,
            judge,
            ai_service,
            concurrency,
            timeout,
        }
    }

    /// Run a learner's code against the public test cases of one question.
    /// Nothing is persisted.
    pub async fn run_public(
        &self,
        test_id: &str,
        request: RunCodeRequest,
    ) -> AppResult<RunCodeResponse> {
        request.validate()?;

        let test = self
            .test_repository
            .find_by_id(test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", test_id)))?;

        let question = test
            .questions
            .get(request.question_index as usize)
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Test has no question at index {}",
                    request.question_index
                ))
            })?;

        let cases: Vec<TestCase> = question
            .test_cases
            .clone()
            .unwrap_or_default()
            .into_iter()
            .filter(|case| case.is_public)
            .collect();

        let results = self
            .run_cases(&request.code, &request.language, &cases)
            .await?;

        Ok(RunCodeResponse { results })
    }

    /// Judge or grade a stored submission and attach the outcomes to the
    /// result. Only the creator of the test may do this.
    pub async fn evaluate_result(
        &self,
        test_id: &str,
        result_id: &str,
        requester_id: &str,
    ) -> AppResult<TestResult> {
        let test = self
            .test_repository
            .find_by_id(test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", test_id)))?;

        if test.created_by != requester_id {
            return Err(AppError::Unauthorized(
                "You can only evaluate results for your own tests".to_string(),
            ));
        }

        let result = self
            .result_repository
            .find_by_id(result_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Result with id '{}' not found", result_id))
            })?;

        if result.test_id != test.id {
            return Err(AppError::ValidationError(
                "Result does not belong to this test".to_string(),
            ));
        }

        match test.kind {
            TestKind::Coding => self.evaluate_coding(&test, &result).await?,
            TestKind::Ai => self.evaluate_descriptive(&test, &result).await?,
            TestKind::Mcq => {
                return Err(AppError::ValidationError(
                    "Multiple-choice results have nothing to evaluate".to_string(),
                ));
            }
        }

        self.result_repository
            .find_by_id(result_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Result with id '{}' not found", result_id)))
    }

    /// Run every answered coding question against all of its test cases,
    /// public and hidden alike.
    async fn evaluate_coding(&self, test: &Test, result: &TestResult) -> AppResult<()> {
        let mut detail = Vec::new();

        for answer in &result.answers {
            let Some(code) = answer.code.as_deref() else {
                continue;
            };
            let Some(question) = test.questions.get(answer.index as usize) else {
                continue;
            };

            let language = match answer.language.as_deref().or(question.language.as_deref()) {
                Some(language) => language,
                None => {
                    log::warn!(
                        "No language on answer {} of result '{}', skipping",
                        answer.index,
                        result.id
                    );
                    continue;
                }
            };

            let cases = question.test_cases.clone().unwrap_or_default();
            if cases.is_empty() {
                continue;
            }

            let results = self.run_cases(code, language, &cases).await?;
            detail.push(QuestionJudgeDetail {
                index: answer.index,
                results,
            });
        }

        self.result_repository
            .attach_coding_detail(&result.id, &detail)
            .await
    }

    /// Grade every answered question of an AI test through the grading
    /// collaborator. Individual grading failures come back as zero marks,
    /// so the attachment itself always happens.
    async fn evaluate_descriptive(&self, test: &Test, result: &TestResult) -> AppResult<()> {
        let mut feedback = Vec::new();

        for answer in &result.answers {
            let Some(text) = answer.answer.as_deref() else {
                continue;
            };
            let Some(question) = test.questions.get(answer.index as usize) else {
                continue;
            };

            let mut graded = self.ai_service.grade_answer(&question.question, text).await;
            graded.index = answer.index;
            feedback.push(graded);
        }

        self.result_repository
            .attach_descriptive_feedback(&result.id, &feedback)
            .await
    }

    async fn run_cases(
        &self,
        source: &str,
        language: &str,
        cases: &[TestCase],
    ) -> AppResult<Vec<CaseOutcome>> {
        let outcomes: Vec<CaseOutcome> = stream::iter(cases.iter().map(|case| {
            let judge = Arc::clone(&self.judge);
            let timeout = self.timeout;
            async move {
                match tokio::time::timeout(timeout, judge.run(source, language, case)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(AppError::UpstreamError(
                        "Code judge call timed out".to_string(),
                    )),
                }
            }
        }))
        .buffered(self.concurrency.max(1))
        .try_collect()
        .await?;

        Ok(outcomes)
    }
}
