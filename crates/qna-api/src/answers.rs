use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use qna_db::DbError;
use qna_types::api::AnswerPayload;
use qna_types::models::Answer;

use crate::convert::{answer_from_row, answer_row};
use crate::error::ApiError;
use crate::extract::Payload;
use crate::routes::confirm;
use crate::state::{AppState, run_db};

/// The question id in the path overrides any `question_id` in the body.
pub async fn create_answer(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Payload(payload): Payload<AnswerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let row = answer_row(payload.validate(Some(question_id), Utc::now())?);
    let answer_id = row.id;

    run_db(&state, move |db| db.create_answer(&row)).await?;

    info!(answer_id, question_id, "Answer created");
    Ok(confirm(StatusCode::CREATED))
}

pub async fn get_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<i64>,
) -> Result<Json<Answer>, ApiError> {
    let row = run_db(&state, move |db| db.get_answer(answer_id))
        .await?
        .ok_or(DbError::not_found("answer", answer_id))?;

    let answer = answer_from_row(row).map_err(|source| ApiError::InvalidRecord {
        resource: "answer",
        id: answer_id,
        source,
    })?;

    Ok(Json(answer))
}

pub async fn delete_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, move |db| db.delete_answer(answer_id)).await?;

    info!(answer_id, "Answer deleted");
    Ok(confirm(StatusCode::OK))
}
