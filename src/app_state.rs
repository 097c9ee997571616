use std::sync::Arc;
use std::time::Duration;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoChallengeAttemptRepository, MongoChallengeRepository, MongoRefreshTokenRepository,
        MongoResultRepository, MongoTestRepository, MongoUserRepository, RefreshTokenRepository,
    },
    services::{
        AiService, ChallengeService, EvaluationService, Judge0Client, RewardService,
        SubmissionService, TestService, UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub test_service: Arc<TestService>,
    pub submission_service: Arc<SubmissionService>,
    pub challenge_service: Arc<ChallengeService>,
    pub evaluation_service: Arc<EvaluationService>,
    pub ai_service: Arc<AiService>,
    pub jwt_service: Arc<JwtService>,
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let user_repository = Arc::new(MongoUserRepository::new(&db));
        user_repository.ensure_indexes().await?;

        let test_repository = Arc::new(MongoTestRepository::new(&db));
        test_repository.ensure_indexes().await?;

        let result_repository = Arc::new(MongoResultRepository::new(&db));
        result_repository.ensure_indexes().await?;

        let challenge_repository = Arc::new(MongoChallengeRepository::new(&db));
        challenge_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoChallengeAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let refresh_token_repository = Arc::new(MongoRefreshTokenRepository::new(&db));
        refresh_token_repository.ensure_indexes().await?;

        let expired = refresh_token_repository.delete_expired().await?;
        if expired > 0 {
            log::info!("Removed {} expired refresh tokens", expired);
        }

        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
            config.jwt_refresh_expiration_hours,
        ));

        let ai_service = Arc::new(AiService::new(&config));
        let judge = Arc::new(Judge0Client::new(
            &config.judge_api_url,
            config.judge_api_key.clone(),
        ));

        let user_service = Arc::new(UserService::new(
            user_repository.clone(),
            refresh_token_repository,
            result_repository.clone(),
            test_repository.clone(),
            jwt_service.clone(),
        ));

        let test_service = Arc::new(TestService::new(test_repository.clone()));

        let reward_service = Arc::new(RewardService::new(
            user_repository.clone(),
            result_repository.clone(),
        ));
        let submission_service = Arc::new(SubmissionService::new(
            test_repository.clone(),
            result_repository.clone(),
            user_repository,
            reward_service,
            config.allow_resubmission,
        ));

        let challenge_service = Arc::new(ChallengeService::new(
            challenge_repository,
            attempt_repository,
        ));

        let evaluation_service = Arc::new(EvaluationService::new(
            test_repository,
            result_repository,
            judge,
            ai_service.clone(),
            config.judge_concurrency,
            Duration::from_secs(config.judge_timeout_secs),
        ));

        Ok(Self {
            user_service,
            test_service,
            submission_service,
            challenge_service,
            evaluation_service,
            ai_service,
            jwt_service,
            db,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
