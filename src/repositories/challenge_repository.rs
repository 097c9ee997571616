use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::challenge::Challenge,
};

#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    async fn create(&self, challenge: Challenge) -> AppResult<Challenge>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Challenge>>;
    async fn find_active_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Option<Challenge>>;
    async fn list(&self) -> AppResult<Vec<Challenge>>;
    async fn update(&self, id: &str, challenge: Challenge) -> AppResult<Challenge>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoChallengeRepository {
    collection: Collection<Challenge>,
}

impl MongoChallengeRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("challenges");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for challenges collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let active_from_index = IndexModel::builder()
            .keys(doc! { "activeFrom": 1 })
            .options(
                IndexOptions::builder()
                    .name("active_from".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(active_from_index).await?;

        log::info!("Successfully created indexes for challenges collection");
        Ok(())
    }
}

#[async_trait]
impl ChallengeRepository for MongoChallengeRepository {
    async fn create(&self, challenge: Challenge) -> AppResult<Challenge> {
        self.collection.insert_one(&challenge).await?;
        Ok(challenge)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Challenge>> {
        let challenge = self.collection.find_one(doc! { "id": id }).await?;
        Ok(challenge)
    }

    // Timestamps persist as RFC 3339 strings, so the range filter uses
    // the same encoding chrono's serializer emits.
    async fn find_active_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Option<Challenge>> {
        let start = start.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let end = end.to_rfc3339_opts(SecondsFormat::AutoSi, true);

        let challenge = self
            .collection
            .find_one(doc! { "activeFrom": { "$gte": start, "$lte": end } })
            .await?;
        Ok(challenge)
    }

    async fn list(&self) -> AppResult<Vec<Challenge>> {
        let challenges = self
            .collection
            .find(doc! {})
            .sort(doc! { "activeFrom": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(challenges)
    }

    async fn update(&self, id: &str, challenge: Challenge) -> AppResult<Challenge> {
        let filter = doc! { "id": id };
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(filter, &challenge)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Challenge with id '{}' not found",
                id
            )));
        }

        Ok(challenge)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Challenge with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
