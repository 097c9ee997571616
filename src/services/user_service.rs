use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    auth::password::{hash_password, verify_password},
    auth::JwtService,
    errors::{AppError, AppResult},
    models::domain::refresh_token::{hash_token, RefreshToken},
    models::domain::test_result::TestResult,
    models::domain::user::{User, UserRole},
    models::dto::request::{LoginRequest, RegisterRequest},
    models::dto::response::{
        AnalyticsResponse, LeaderboardEntryDto, MeResponse, OverallStats, SubjectStats, UserDto,
    },
    repositories::{RefreshTokenRepository, ResultRepository, TestRepository, UserRepository},
};

/// Access token plus the rotating refresh token issued alongside it.
pub struct IssuedTokens {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    refresh_token_repository: Arc<dyn RefreshTokenRepository>,
    result_repository: Arc<dyn ResultRepository>,
    test_repository: Arc<dyn TestRepository>,
    jwt_service: Arc<JwtService>,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        refresh_token_repository: Arc<dyn RefreshTokenRepository>,
        result_repository: Arc<dyn ResultRepository>,
        test_repository: Arc<dyn TestRepository>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repository,
            refresh_token_repository,
            result_repository,
            test_repository,
            jwt_service,
        }
    }

    /// Register a learner account and sign them in. Admin accounts are
    /// provisioned out of band.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<IssuedTokens> {
        request.validate()?;

        if self
            .user_repository
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists("Username already taken".to_string()));
        }

        if self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(
            &request.username,
            &request.email,
            &password_hash,
            UserRole::Learner,
        );

        let user = self.user_repository.create(user).await?;
        log::info!("Registered user '{}'", user.username);

        self.issue_tokens(user).await
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<IssuedTokens> {
        request.validate()?;

        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        log::info!("User '{}' logged in", user.username);

        self.issue_tokens(user).await
    }

    /// Rotate a refresh token: the presented token is revoked and a fresh
    /// pair is issued. Only the SHA-256 hash is ever compared or stored.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<IssuedTokens> {
        let claims = self.jwt_service.validate_refresh_token(refresh_token)?;

        let hash = hash_token(refresh_token);
        let stored = self
            .refresh_token_repository
            .find_by_token_hash(&hash)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Refresh token not recognized".to_string()))?;

        if !stored.is_valid() {
            return Err(AppError::Unauthorized(
                "Refresh token expired or revoked".to_string(),
            ));
        }

        self.refresh_token_repository
            .revoke_by_token_hash(&hash)
            .await?;

        let user = self.get_user_for_token(&claims.sub).await?;
        log::info!("Refreshed tokens for '{}'", user.username);

        self.issue_tokens(user).await
    }

    /// Resolve the subject of a token to a user. Subjects are ObjectId hex
    /// for current tokens, with a username fallback for older ones.
    pub async fn get_user_for_token(&self, subject: &str) -> AppResult<User> {
        if let Some(user) = self.user_repository.find_by_id(subject).await? {
            return Ok(user);
        }

        self.user_repository
            .find_by_username(subject)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User for token not found".to_string()))
    }

    /// Profile plus derived attempt count.
    pub async fn profile(&self, subject: &str) -> AppResult<MeResponse> {
        let user = self.get_user_for_token(subject).await?;
        let attempts = self.result_repository.count_by_user(subject).await?;

        Ok(MeResponse {
            user: UserDto::from(user),
            attempts,
        })
    }

    pub async fn leaderboard(&self, limit: i64) -> AppResult<Vec<LeaderboardEntryDto>> {
        let users = self.user_repository.leaderboard(limit).await?;

        Ok(users.into_iter().map(LeaderboardEntryDto::from).collect())
    }

    /// Overall and per-subject accuracy over the caller's results. Results
    /// whose test no longer exists count towards the overall numbers but
    /// not towards any subject.
    pub async fn analytics(&self, user_id: &str) -> AppResult<AnalyticsResponse> {
        let results = self.result_repository.find_by_user(user_id).await?;

        let mut subject_totals: BTreeMap<String, (i64, f64)> = BTreeMap::new();
        let mut subjects_by_test: BTreeMap<String, Option<String>> = BTreeMap::new();
        let mut percent_sum = 0.0;

        for result in &results {
            let percent = percent_of(result);
            percent_sum += percent;

            let subject = match subjects_by_test.get(&result.test_id) {
                Some(cached) => cached.clone(),
                None => {
                    let subject = self
                        .test_repository
                        .find_by_id(&result.test_id)
                        .await?
                        .map(|test| test.subject);
                    subjects_by_test.insert(result.test_id.clone(), subject.clone());
                    subject
                }
            };

            if let Some(subject) = subject {
                let entry = subject_totals.entry(subject).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += percent;
            }
        }

        let attempts = results.len() as i64;
        let average_percent = if attempts > 0 {
            percent_sum / attempts as f64
        } else {
            0.0
        };

        let subjects = subject_totals
            .into_iter()
            .map(|(subject, (count, sum))| SubjectStats {
                subject,
                attempts: count,
                average_percent: sum / count as f64,
            })
            .collect();

        Ok(AnalyticsResponse {
            overall: OverallStats {
                attempts,
                average_percent,
            },
            subjects,
        })
    }

    async fn issue_tokens(&self, user: User) -> AppResult<IssuedTokens> {
        let token = self.jwt_service.create_token(&user)?;

        let subject = user
            .id
            .map(|oid| oid.to_hex())
            .unwrap_or_else(|| user.username.clone());
        let refresh_token = self.jwt_service.create_refresh_token(&subject)?;

        let expires_at =
            Utc::now() + Duration::hours(self.jwt_service.refresh_expiration_hours());
        self.refresh_token_repository
            .create(RefreshToken::new(
                subject,
                hash_token(&refresh_token),
                expires_at,
            ))
            .await?;

        Ok(IssuedTokens {
            token,
            refresh_token,
            user,
        })
    }
}

fn percent_of(result: &TestResult) -> f64 {
    if result.total > 0 {
        f64::from(result.score) * 100.0 / f64::from(result.total)
    } else {
        0.0
    }
}
