use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::request::GenerateQuestionsRequest,
};

/// Draft MCQs for a topic without creating a test. The admin reviews
/// the batch client-side before saving anything.
#[post("/api/generate-questions")]
async fn generate_questions(
    state: web::Data<AppState>,
    request: web::Json<GenerateQuestionsRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let response = state
        .ai_service
        .generate_questions(request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
