use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::test::Test,
};

#[async_trait]
pub trait TestRepository: Send + Sync {
    async fn create(&self, test: Test) -> AppResult<Test>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>>;
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Test>>;
    async fn code_exists(&self, code: &str) -> AppResult<bool>;
    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Test>, i64)>;
    async fn list_by_creator(&self, created_by: &str) -> AppResult<Vec<Test>>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoTestRepository {
    collection: Collection<Test>,
}

impl MongoTestRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("tests");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for tests collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // Unique join codes are enforced here as well, in case two
        // concurrent creates draw the same code.
        let code_index = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("code_unique".to_string())
                    .build(),
            )
            .build();

        let creator_index = IndexModel::builder()
            .keys(doc! { "createdBy": 1 })
            .options(
                IndexOptions::builder()
                    .name("created_by".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(code_index).await?;
        self.collection.create_index(creator_index).await?;

        log::info!("Successfully created indexes for tests collection");
        Ok(())
    }
}

#[async_trait]
impl TestRepository for MongoTestRepository {
    async fn create(&self, test: Test) -> AppResult<Test> {
        self.collection.insert_one(&test).await?;
        Ok(test)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>> {
        let test = self.collection.find_one(doc! { "id": id }).await?;
        Ok(test)
    }

    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Test>> {
        let test = self
            .collection
            .find_one(doc! { "code": code, "isActive": true })
            .await?;
        Ok(test)
    }

    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let test = self.collection.find_one(doc! { "code": code }).await?;
        Ok(test.is_some())
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Test>, i64)> {
        let total = self.collection.count_documents(doc! {}).await?;

        let tests = self
            .collection
            .find(doc! {})
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((tests, total as i64))
    }

    async fn list_by_creator(&self, created_by: &str) -> AppResult<Vec<Test>> {
        let tests = self
            .collection
            .find(doc! { "createdBy": created_by })
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(tests)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Test with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
