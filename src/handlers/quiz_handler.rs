use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{StartQuizRequest, SubmitAnswerRequest},
};

#[post("/quiz/start")]
pub async fn start_quiz(
    state: web::Data<AppState>,
    request: web::Json<StartQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state
        .quiz_session_service
        .start(auth.0.user_id, &request.difficulty)
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[get("/quiz/progress")]
pub async fn quiz_progress(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state.quiz_session_service.get_progress(auth.0.user_id).await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[post("/quiz/answer")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state
        .quiz_session_service
        .submit_answer(auth.0.user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[post("/quiz/finish")]
pub async fn finish_quiz(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let summary = state.quiz_session_service.finish(auth.0.user_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}
