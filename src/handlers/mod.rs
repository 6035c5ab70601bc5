pub mod auth_handler;
pub mod question_handler;
pub mod quiz_handler;
pub mod user_handler;

use actix_web::web;

use crate::{auth::AuthMiddleware, errors::AppError};

/// Malformed bodies and path parameters answer with the same error shape as
/// every other failure.
fn extractor_configs() -> (web::JsonConfig, web::PathConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid request body: {}", err)).into()
    });
    let path = web::PathConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid path parameter: {}", err)).into()
    });
    (json, path)
}

/// Registers every route. Everything under `/api` requires a bearer token,
/// and `/api/admin` additionally requires the admin role.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let (json_config, path_config) = extractor_configs();

    cfg.app_data(json_config)
        .app_data(path_config)
        .service(user_handler::health_check)
        .service(user_handler::health_check_ready)
        .service(
            web::scope("/auth")
                .service(auth_handler::register)
                .service(auth_handler::login),
        )
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(user_handler::profile)
                .service(user_handler::leaderboard)
                .service(question_handler::list_questions)
                .service(quiz_handler::start_quiz)
                .service(quiz_handler::quiz_progress)
                .service(quiz_handler::submit_answer)
                .service(quiz_handler::finish_quiz)
                .service(
                    web::scope("/admin")
                        .service(question_handler::create_question)
                        .service(question_handler::update_question)
                        .service(question_handler::delete_question),
                ),
        );
}
