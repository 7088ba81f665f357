use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;

use qna_types::{ValidationError, ValidationReason};

use crate::error::ApiError;

/// JSON body extractor whose failures name the field that broke.
#[derive(Debug)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ValidationError::malformed(e.body_text()))?;

        Ok(Self(decode(&bytes)?))
    }
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ValidationError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);

    serde_path_to_error::deserialize(de).map_err(|e| {
        let detail = e.inner().to_string();
        // Innermost object key; syntax errors and non-object bodies have none.
        let field = e.path().iter().rev().find_map(|segment| match segment {
            Segment::Map { key } => Some(key.clone()),
            _ => None,
        });

        match field {
            Some(field) => ValidationError::new(field, ValidationReason::Malformed(detail)),
            None => ValidationError::malformed(detail),
        }
    })
}
