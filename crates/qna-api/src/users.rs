use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use qna_types::api::UserPayload;

use crate::convert::user_row;
use crate::error::ApiError;
use crate::extract::Payload;
use crate::routes::confirm;
use crate::state::{AppState, run_db};

pub async fn create_user(
    State(state): State<AppState>,
    Payload(payload): Payload<UserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let row = user_row(payload.validate()?);
    let user_id = row.id.clone();

    run_db(&state, move |db| db.create_user(&row)).await?;

    info!(%user_id, "User created");
    Ok(confirm(StatusCode::CREATED))
}

/// Answers written by the user go with them.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = user_id.clone();
    run_db(&state, move |db| db.delete_user(&id)).await?;

    info!(%user_id, "User deleted");
    Ok(confirm(StatusCode::OK))
}
