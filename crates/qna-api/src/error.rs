use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use qna_db::DbError;
use qna_types::ValidationError;

const GENERIC_DB_DETAIL: &str = "database operation failed";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input from the caller.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// A stored row that no longer passes the output rules.
    #[error("stored {resource} '{id}' is invalid: {source}")]
    InvalidRecord {
        resource: &'static str,
        id: i64,
        source: ValidationError,
    },

    #[error("internal error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail, field) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string(), Some(e.field.to_string())),
            // Not-found and duplicate writes stay 500 to keep the existing contract,
            // but say what was missing. Faults only get the generic detail.
            Self::Db(e) if e.is_fault() => {
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_DB_DETAIL.to_string(), None)
            }
            Self::Db(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
            Self::InvalidRecord { .. } => {
                warn!(error = %self, "Refusing to serve invalid record");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_DB_DETAIL.to_string(), None)
            }
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None),
        };

        (status, Json(ErrorBody { detail, field })).into_response()
    }
}
