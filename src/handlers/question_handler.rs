use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{AdminUser, AuthenticatedUser},
    errors::AppError,
    models::{
        domain::{NewQuestion, QuestionPatch},
        dto::response::MessageResponse,
    },
};

#[get("/questions/{difficulty}")]
pub async fn list_questions(
    state: web::Data<AppState>,
    difficulty: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let questions = state.question_service.list(&difficulty).await?;
    Ok(HttpResponse::Ok().json(questions))
}

// Admin extractors come first so non-admins get 403 before the body is parsed.

#[post("/questions")]
pub async fn create_question(
    admin: AdminUser,
    state: web::Data<AppState>,
    request: web::Json<NewQuestion>,
) -> Result<HttpResponse, AppError> {
    let question = state.question_service.create(request.into_inner()).await?;
    log::debug!("Question {} created by {}", question.id, admin.0.username);
    Ok(HttpResponse::Created().json(question))
}

#[put("/questions/{id}")]
pub async fn update_question(
    _admin: AdminUser,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    request: web::Json<QuestionPatch>,
) -> Result<HttpResponse, AppError> {
    let question = state
        .question_service
        .update(id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(question))
}

#[delete("/questions/{id}")]
pub async fn delete_question(
    _admin: AdminUser,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    state.question_service.delete(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Question deleted successfully")))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web::Data, App};
    use serde_json::{json, Value};

    use crate::{
        handlers::configure,
        models::domain::{Difficulty, Question},
        repositories::{
            question_repository::MockQuestionRepository,
            quiz_session_repository::MockQuizSessionRepository,
            user_repository::MockUserRepository,
        },
        test_utils::fixtures::{admin_bearer, app_state, idle_app_state, player_bearer},
    };

    fn with_questions(questions: MockQuestionRepository) -> crate::app_state::AppState {
        app_state(
            MockUserRepository::new(),
            questions,
            MockQuizSessionRepository::new(),
        )
    }

    #[actix_web::test]
    async fn test_list_questions_includes_answer_key() {
        let mut questions = MockQuestionRepository::new();
        questions.expect_list_by_difficulty().returning(|d| {
            Ok(vec![
                Question::test_question(1, d, &["a", "b"], 1),
                Question::test_question(2, d, &["c", "d"], 0),
            ])
        });
        let app = test::init_service(
            App::new()
                .app_data(Data::new(with_questions(questions)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/questions/easy")
            .insert_header(("Authorization", player_bearer()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));
        assert_eq!(body[0]["id"], 1);
        assert_eq!(body[0]["correct_answer_index"], 1);
    }

    #[actix_web::test]
    async fn test_non_admin_cannot_create_question() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(idle_app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/questions")
            .insert_header(("Authorization", player_bearer()))
            .set_json(json!({
                "question_text": "2 + 2?",
                "options": ["3", "4"],
                "correct_answer_index": 1,
                "difficulty": "easy"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_admin_creates_question() {
        let mut questions = MockQuestionRepository::new();
        questions.expect_create().times(1).returning(|q| {
            Ok(Question {
                id: 9,
                question_text: q.question_text,
                options: q.options,
                correct_answer_index: q.correct_answer_index,
                reference: q.reference,
                difficulty: q.difficulty,
                created_at: chrono::Utc::now(),
                updated_at: None,
            })
        });
        let app = test::init_service(
            App::new()
                .app_data(Data::new(with_questions(questions)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/questions")
            .insert_header(("Authorization", admin_bearer()))
            .set_json(json!({
                "question_text": "2 + 2?",
                "options": ["3", "4"],
                "correct_answer_index": 1,
                "difficulty": "medium"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 9);
        assert_eq!(body["difficulty"], "medium");
        assert_eq!(body["reference"], "");
    }

    #[actix_web::test]
    async fn test_create_with_unknown_difficulty_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(idle_app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/questions")
            .insert_header(("Authorization", admin_bearer()))
            .set_json(json!({
                "question_text": "2 + 2?",
                "options": ["3", "4"],
                "correct_answer_index": 1,
                "difficulty": "hard"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_with_non_numeric_id_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(idle_app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/admin/questions/abc")
            .insert_header(("Authorization", admin_bearer()))
            .set_json(json!({"question_text": "New"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_applies_patch() {
        let mut questions = MockQuestionRepository::new();
        questions.expect_find_by_id().returning(|id| {
            Ok(Some(Question::test_question(id, Difficulty::Easy, &["a", "b"], 0)))
        });
        questions.expect_update().returning(|id, patch| {
            let existing = Question::test_question(id, Difficulty::Easy, &["a", "b"], 0);
            Ok(Some(existing.merged_with(&patch)))
        });
        let app = test::init_service(
            App::new()
                .app_data(Data::new(with_questions(questions)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/admin/questions/3")
            .insert_header(("Authorization", admin_bearer()))
            .set_json(json!({"difficulty": "advance"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["difficulty"], "advance");
        assert_eq!(body["question_text"], "Question 3");
    }

    #[actix_web::test]
    async fn test_delete_reports_missing_question() {
        let mut questions = MockQuestionRepository::new();
        questions.expect_delete().returning(|id| Ok(id == 1));
        let app = test::init_service(
            App::new()
                .app_data(Data::new(with_questions(questions)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::delete()
            .uri("/api/admin/questions/1")
            .insert_header(("Authorization", admin_bearer()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Question deleted successfully");

        let req = test::TestRequest::delete()
            .uri("/api/admin/questions/2")
            .insert_header(("Authorization", admin_bearer()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
