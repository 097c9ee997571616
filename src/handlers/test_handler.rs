use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{
            CreateAiTestRequest, CreateTestRequest, PaginationParams, RunCodeRequest,
            SubmitTestRequest,
        },
        response::{MessageResponse, TestsResponse},
    },
};

#[post("/api/tests")]
async fn create_test(
    state: web::Data<AppState>,
    request: web::Json<CreateTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let test = state
        .test_service
        .create_test(request.into_inner(), &auth.0.sub)
        .await?;
    Ok(HttpResponse::Created().json(test))
}

#[post("/api/tests/create-ai-test")]
async fn create_ai_test(
    state: web::Data<AppState>,
    request: web::Json<CreateAiTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let response = state
        .test_service
        .create_ai_test(request.into_inner(), &auth.0.sub)
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/tests")]
async fn get_all_tests(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let pagination = query.into_inner();
    let (tests, total) = state
        .test_service
        .get_all_tests(pagination.offset(), pagination.limit())
        .await?;
    Ok(HttpResponse::Ok().json(TestsResponse { tests, total }))
}

#[get("/api/tests/mine")]
async fn get_my_tests(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let tests = state.test_service.get_my_tests(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(tests))
}

#[get("/api/tests/{id}")]
async fn get_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let test = state.test_service.get_test(&id).await?;
    Ok(HttpResponse::Ok().json(test))
}

#[delete("/api/tests/{id}")]
async fn delete_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.test_service.delete_test(&id, &auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Test deleted successfully".to_string(),
    }))
}

/// Join-code lookup for takers. Returns the test with answer keys and
/// hidden cases stripped.
#[get("/api/tests/public/by-code/{code}")]
async fn find_test_by_code(
    state: web::Data<AppState>,
    code: web::Path<String>,
    _auth: AuthenticatedUser, // Require authentication
) -> Result<HttpResponse, AppError> {
    let test = state.test_service.find_by_code(&code).await?;
    Ok(HttpResponse::Ok().json(test))
}

#[post("/api/tests/{id}/submit")]
async fn submit_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SubmitTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .submission_service
        .submit(&id, &auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/tests/{id}/my-result")]
async fn my_result(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let result = state.submission_service.my_result(&id, &auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/api/tests/{id}/results")]
async fn results_for_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let results = state
        .submission_service
        .results_for_test(&id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(results))
}

#[get("/api/tests/results/mine")]
async fn my_results(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let results = state.submission_service.my_results(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(results))
}

/// Dry run of a coding answer against the question's public cases.
/// Nothing is persisted.
#[post("/api/tests/{id}/run-code")]
async fn run_code(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<RunCodeRequest>,
    _auth: AuthenticatedUser, // Require authentication
) -> Result<HttpResponse, AppError> {
    let response = state
        .evaluation_service
        .run_public(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/tests/{id}/results/{result_id}/evaluate")]
async fn evaluate_result(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let (test_id, result_id) = path.into_inner();
    let result = state
        .evaluation_service
        .evaluate_result(&test_id, &result_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
