use std::sync::Arc;

use chrono::{Duration, NaiveTime, Utc};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::challenge::{Challenge, ChallengeKind},
    models::domain::challenge_attempt::ChallengeAttempt,
    models::dto::request::{AttemptChallengeRequest, ChallengeRequest},
    models::dto::response::AttemptChallengeResponse,
    repositories::{ChallengeAttemptRepository, ChallengeRepository},
};

pub struct ChallengeService {
    challenge_repository: Arc<dyn ChallengeRepository>,
    attempt_repository: Arc<dyn ChallengeAttemptRepository>,
}

impl ChallengeService {
    pub fn new(
        challenge_repository: Arc<dyn ChallengeRepository>,
        attempt_repository: Arc<dyn ChallengeAttemptRepository>,
    ) -> Self {
        Self {
            challenge_repository,
            attempt_repository,
        }
    }

    pub async fn create_challenge(&self, request: ChallengeRequest) -> AppResult<Challenge> {
        request.validate()?;
        validate_kind_fields(&request)?;

        let challenge = challenge_from_request(request, None, None);
        let challenge = self.challenge_repository.create(challenge).await?;
        log::info!("Created challenge '{}'", challenge.id);

        Ok(challenge)
    }

    /// Replace a challenge. Fields that belong to the other kind are
    /// cleared so a kind switch does not leave stale data behind.
    pub async fn update_challenge(
        &self,
        id: &str,
        request: ChallengeRequest,
    ) -> AppResult<Challenge> {
        request.validate()?;
        validate_kind_fields(&request)?;

        let existing = self.get_challenge(id).await?;
        let challenge = challenge_from_request(request, Some(existing.id), existing.created_at);

        self.challenge_repository.update(id, challenge).await
    }

    /// The challenge whose `active_from` falls inside the current UTC day,
    /// with the answer key blanked out.
    pub async fn today(&self) -> AppResult<Challenge> {
        let start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1) - Duration::milliseconds(1);

        let mut challenge = self
            .challenge_repository
            .find_active_between(start, end)
            .await?
            .ok_or_else(|| AppError::NotFound("No challenge for today".to_string()))?;

        challenge.correct_answer = String::new();

        Ok(challenge)
    }

    pub async fn list_challenges(&self) -> AppResult<Vec<Challenge>> {
        self.challenge_repository.list().await
    }

    pub async fn get_challenge(&self, id: &str) -> AppResult<Challenge> {
        self.challenge_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Challenge with id '{}' not found", id)))
    }

    pub async fn delete_challenge(&self, id: &str) -> AppResult<()> {
        self.challenge_repository.delete(id).await?;
        log::info!("Deleted challenge '{}'", id);

        Ok(())
    }

    /// Record an attempt. Question kinds are checked by exact equality;
    /// coding kinds always record `correct = false` and keep the code
    /// verbatim. The attempt is persisted whatever the outcome.
    pub async fn attempt_challenge(
        &self,
        challenge_id: &str,
        user_id: &str,
        request: AttemptChallengeRequest,
    ) -> AppResult<AttemptChallengeResponse> {
        request.validate()?;

        let challenge = self.get_challenge(challenge_id).await?;
        let correct = is_correct(&challenge, request.answer.as_deref());

        let mut attempt = ChallengeAttempt::new(&challenge.id, user_id, correct);
        attempt.answer = request.answer;
        attempt.code = request.code;
        attempt.language = request.language;

        let attempt = self.attempt_repository.create(attempt).await?;
        log::info!(
            "User '{}' attempted challenge '{}' (correct: {})",
            user_id,
            challenge_id,
            correct
        );

        Ok(AttemptChallengeResponse {
            correct,
            attempt_id: attempt.id,
        })
    }
}

fn validate_kind_fields(request: &ChallengeRequest) -> AppResult<()> {
    if request.kind == ChallengeKind::Question
        && request.correct_answer.as_deref().unwrap_or("").is_empty()
    {
        return Err(AppError::ValidationError(
            "Correct answer is required for question type".to_string(),
        ));
    }

    Ok(())
}

fn challenge_from_request(
    request: ChallengeRequest,
    id: Option<String>,
    created_at: Option<chrono::DateTime<Utc>>,
) -> Challenge {
    let mut challenge = Challenge::new(request.kind, &request.question, request.active_from);

    if let Some(id) = id {
        challenge.id = id;
    }
    if created_at.is_some() {
        challenge.created_at = created_at;
    }

    challenge.options = request.options;
    challenge.subject = request.subject;

    match request.kind {
        ChallengeKind::Question => {
            challenge.correct_answer = request.correct_answer.unwrap_or_default();
        }
        ChallengeKind::Coding => {
            challenge.starter_code = request.starter_code;
            challenge.language = request.language;
            challenge.test_cases = request.test_cases;
        }
    }

    challenge
}

fn is_correct(challenge: &Challenge, answer: Option<&str>) -> bool {
    match challenge.kind {
        ChallengeKind::Question => answer == Some(challenge.correct_answer.as_str()),
        ChallengeKind::Coding => false,
    }
}
