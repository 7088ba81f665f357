use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use qna_types::api::QuestionPayload;
use qna_types::models::{Question, QuestionThread};

use crate::convert::{question_from_row, question_row, valid_answers, valid_questions};
use crate::error::ApiError;
use crate::extract::Payload;
use crate::routes::confirm;
use crate::state::{AppState, run_db};

/// Rows that fail output validation are left out of the listing.
pub async fn list_questions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Question>>, ApiError> {
    let rows = run_db(&state, |db| db.list_questions()).await?;
    Ok(Json(valid_questions(rows)))
}

pub async fn create_question(
    State(state): State<AppState>,
    Payload(payload): Payload<QuestionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let row = question_row(payload.validate(Utc::now())?);
    let question_id = row.id;

    run_db(&state, move |db| db.create_question(&row)).await?;

    info!(question_id, "Question created");
    Ok(confirm(StatusCode::CREATED))
}

/// `[question, answers]`, or `[null, null]` when the question does not exist.
pub async fn get_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Json<QuestionThread>, ApiError> {
    let Some((question, answers)) =
        run_db(&state, move |db| db.get_question_with_answers(question_id)).await?
    else {
        return Ok(Json(QuestionThread::missing()));
    };

    let question = question_from_row(question).map_err(|source| ApiError::InvalidRecord {
        resource: "question",
        id: question_id,
        source,
    })?;

    Ok(Json(QuestionThread(
        Some(question),
        Some(valid_answers(answers)),
    )))
}

/// Answers under the question go with it.
pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, move |db| db.delete_question(question_id)).await?;

    info!(question_id, "Question deleted");
    Ok(confirm(StatusCode::OK))
}
