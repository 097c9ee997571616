use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::test::{Question, Test, TestKind},
    models::dto::request::{CreateAiTestRequest, CreateTestRequest, GeneratedQuestion},
    models::dto::response::{CreateAiTestResponse, PublicTestDto},
    repositories::TestRepository,
    services::join_code,
};

pub struct TestService {
    test_repository: Arc<dyn TestRepository>,
}

impl TestService {
    pub fn new(test_repository: Arc<dyn TestRepository>) -> Self {
        Self { test_repository }
    }

    /// Create a test with a freshly assigned join code.
    pub async fn create_test(
        &self,
        request: CreateTestRequest,
        created_by: &str,
    ) -> AppResult<Test> {
        request.validate()?;

        let code = join_code::generate_unique(self.test_repository.as_ref()).await?;
        let test = Test::new(
            &request.name,
            &request.subject,
            &request.difficulty,
            request.kind,
            request.questions,
            &code,
            created_by,
        );

        let test = self.test_repository.create(test).await?;
        log::info!("Created test '{}' with join code '{}'", test.id, test.code);

        Ok(test)
    }

    /// Persist a batch of AI-authored questions as an `ai` kind test.
    pub async fn create_ai_test(
        &self,
        request: CreateAiTestRequest,
        created_by: &str,
    ) -> AppResult<CreateAiTestResponse> {
        request.validate()?;

        let code = join_code::generate_unique(self.test_repository.as_ref()).await?;
        let test = Test::new(
            &request.name,
            &request.subject,
            &request.difficulty,
            TestKind::Ai,
            questions_from_generated(request.questions),
            &code,
            created_by,
        );

        let test = self.test_repository.create(test).await?;
        log::info!(
            "Created AI test '{}' with join code '{}'",
            test.id,
            test.code
        );

        Ok(CreateAiTestResponse {
            message: "AI Test created successfully".to_string(),
            code: test.code.clone(),
            test,
        })
    }

    pub async fn get_all_tests(&self, offset: i64, limit: i64) -> AppResult<(Vec<Test>, i64)> {
        self.test_repository.list(offset, limit).await
    }

    pub async fn get_my_tests(&self, created_by: &str) -> AppResult<Vec<Test>> {
        self.test_repository.list_by_creator(created_by).await
    }

    pub async fn get_test(&self, id: &str) -> AppResult<Test> {
        self.test_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", id)))
    }

    /// Delete a test the requester created.
    pub async fn delete_test(&self, id: &str, requester_id: &str) -> AppResult<()> {
        let test = self.get_test(id).await?;

        if test.created_by != requester_id {
            return Err(AppError::Unauthorized(
                "You can only delete your own tests".to_string(),
            ));
        }

        self.test_repository.delete(id).await?;
        log::info!("Deleted test '{}'", id);

        Ok(())
    }

    /// Learner-facing lookup by join code. The code is matched uppercase
    /// and only active tests resolve; the projection never carries answer
    /// keys or hidden test cases.
    pub async fn find_by_code(&self, code: &str) -> AppResult<PublicTestDto> {
        let code = code.trim().to_uppercase();

        let test = self
            .test_repository
            .find_active_by_code(&code)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid code".to_string()))?;

        Ok(PublicTestDto::from(test))
    }
}

fn questions_from_generated(generated: Vec<GeneratedQuestion>) -> Vec<Question> {
    generated
        .into_iter()
        .map(|entry| Question {
            question: entry.question,
            options: entry.options,
            correct_answer: entry.correct_answer,
            starter_code: None,
            language: None,
            test_cases: None,
        })
        .collect()
}
