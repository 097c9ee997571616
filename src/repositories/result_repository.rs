use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::test_result::{AnswerFeedback, QuestionJudgeDetail, TestResult},
};

#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn create(&self, result: TestResult) -> AppResult<TestResult>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestResult>>;
    async fn find_by_test_and_user(
        &self,
        test_id: &str,
        user_id: &str,
    ) -> AppResult<Option<TestResult>>;
    async fn find_by_test(&self, test_id: &str) -> AppResult<Vec<TestResult>>;
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<TestResult>>;
    async fn count_by_user(&self, user_id: &str) -> AppResult<u64>;
    async fn attach_coding_detail(
        &self,
        id: &str,
        detail: &[QuestionJudgeDetail],
    ) -> AppResult<()>;
    async fn attach_descriptive_feedback(
        &self,
        id: &str,
        feedback: &[AnswerFeedback],
    ) -> AppResult<()>;
}

pub struct MongoResultRepository {
    collection: Collection<TestResult>,
}

impl MongoResultRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("results");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for results collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let test_user_index = IndexModel::builder()
            .keys(doc! { "testId": 1, "userId": 1 })
            .options(IndexOptions::builder().name("test_user".to_string()).build())
            .build();

        let user_id_index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(IndexOptions::builder().name("user_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(test_user_index).await?;
        self.collection.create_index(user_id_index).await?;

        log::info!("Successfully created indexes for results collection");
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for MongoResultRepository {
    async fn create(&self, result: TestResult) -> AppResult<TestResult> {
        self.collection.insert_one(&result).await?;
        Ok(result)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestResult>> {
        let result = self.collection.find_one(doc! { "id": id }).await?;
        Ok(result)
    }

    // Resubmission can leave several results per (test, user); the
    // newest one wins.
    async fn find_by_test_and_user(
        &self,
        test_id: &str,
        user_id: &str,
    ) -> AppResult<Option<TestResult>> {
        let result = self
            .collection
            .find_one(doc! { "testId": test_id, "userId": user_id })
            .sort(doc! { "submittedAt": -1 })
            .await?;
        Ok(result)
    }

    async fn find_by_test(&self, test_id: &str) -> AppResult<Vec<TestResult>> {
        let results = self
            .collection
            .find(doc! { "testId": test_id })
            .sort(doc! { "submittedAt": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(results)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<TestResult>> {
        let results = self
            .collection
            .find(doc! { "userId": user_id })
            .sort(doc! { "submittedAt": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(results)
    }

    async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "userId": user_id })
            .await?;
        Ok(count)
    }

    async fn attach_coding_detail(
        &self,
        id: &str,
        detail: &[QuestionJudgeDetail],
    ) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "codingDetail": to_bson(&detail)? } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Result with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn attach_descriptive_feedback(
        &self,
        id: &str,
        feedback: &[AnswerFeedback],
    ) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "descriptiveFeedback": to_bson(&feedback)? } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Result with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
