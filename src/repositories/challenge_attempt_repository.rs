use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::challenge_attempt::ChallengeAttempt,
};

#[async_trait]
pub trait ChallengeAttemptRepository: Send + Sync {
    async fn create(&self, attempt: ChallengeAttempt) -> AppResult<ChallengeAttempt>;
}

pub struct MongoChallengeAttemptRepository {
    collection: Collection<ChallengeAttempt>,
}

impl MongoChallengeAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("challenge_attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for challenge_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;

        log::info!("Successfully created indexes for challenge_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl ChallengeAttemptRepository for MongoChallengeAttemptRepository {
    async fn create(&self, attempt: ChallengeAttempt) -> AppResult<ChallengeAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }
}
