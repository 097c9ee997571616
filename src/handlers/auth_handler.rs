use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{LoginRequest, RegisterRequest},
        response::UserDto,
    },
};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub token: String,
    pub refresh_token: String,
}

#[post("/api/auth/register")]
async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let issued = state.user_service.register(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token: issued.token,
        refresh_token: issued.refresh_token,
        user: UserDto::from(issued.user),
    }))
}

#[post("/api/auth/login")]
async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let issued = state.user_service.login(request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token: issued.token,
        refresh_token: issued.refresh_token,
        user: UserDto::from(issued.user),
    }))
}

/// Exchanges a refresh token for a fresh token pair. The presented
/// token is revoked in the process, so each one is good for a single
/// exchange.
#[post("/api/auth/refresh")]
async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    let issued = state.user_service.refresh(&request.refresh_token).await?;

    Ok(HttpResponse::Ok().json(RefreshTokenResponse {
        token: issued.token,
        refresh_token: issued.refresh_token,
    }))
}
