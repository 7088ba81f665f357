use axum::{
    Json, Router,
    http::StatusCode,
    routing::{delete, get, post},
};

use qna_types::api::Confirmation;

use crate::state::AppState;
use crate::{answers, questions, users};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        // Users
        .route("/new_user", post(users::create_user))
        .route("/delete_user/{user_id}", delete(users::delete_user))
        // Questions
        .route(
            "/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route(
            "/questions/{question_id}",
            get(questions::get_question).delete(questions::delete_question),
        )
        // Answers
        .route("/questions/{question_id}/answers", post(answers::create_answer))
        .route(
            "/answers/{answer_id}",
            get(answers::get_answer).delete(answers::delete_answer),
        )
        .with_state(state)
}

async fn home() -> (StatusCode, Json<Confirmation>) {
    confirm(StatusCode::OK)
}

pub(crate) fn confirm(status: StatusCode) -> (StatusCode, Json<Confirmation>) {
    (status, Json(Confirmation::new(status.as_u16())))
}
