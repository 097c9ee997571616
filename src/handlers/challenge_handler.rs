use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{AttemptChallengeRequest, ChallengeRequest},
    models::dto::response::MessageResponse,
};

#[post("/api/challenges")]
async fn create_challenge(
    state: web::Data<AppState>,
    request: web::Json<ChallengeRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let challenge = state
        .challenge_service
        .create_challenge(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(challenge))
}

/// The challenge scheduled for the current UTC day, with the answer
/// key stripped.
#[get("/api/challenges/today")]
async fn todays_challenge(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser, // Require authentication
) -> Result<HttpResponse, AppError> {
    let challenge = state.challenge_service.today().await?;
    Ok(HttpResponse::Ok().json(challenge))
}

#[get("/api/challenges")]
async fn list_challenges(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let challenges = state.challenge_service.list_challenges().await?;
    Ok(HttpResponse::Ok().json(challenges))
}

#[get("/api/challenges/{id}")]
async fn get_challenge(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let challenge = state.challenge_service.get_challenge(&id).await?;
    Ok(HttpResponse::Ok().json(challenge))
}

#[put("/api/challenges/{id}")]
async fn update_challenge(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<ChallengeRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let challenge = state
        .challenge_service
        .update_challenge(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(challenge))
}

#[delete("/api/challenges/{id}")]
async fn delete_challenge(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.challenge_service.delete_challenge(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Challenge deleted successfully".to_string(),
    }))
}

#[post("/api/challenges/{id}/attempt")]
async fn attempt_challenge(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<AttemptChallengeRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .challenge_service
        .attempt_challenge(&id, &auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(response))
}
