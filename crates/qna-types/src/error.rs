use std::borrow::Cow;

use thiserror::Error;

/// A request or stored row that broke one of the field rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending field; `body` when the payload is not JSON at all.
    pub field: Cow<'static, str>,
    pub reason: ValidationReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationReason {
    #[error("must be at least {min} characters")]
    TooShort { min: usize },

    #[error("must be at most {max} characters")]
    TooLong { max: usize },

    #[error("expected {expected}")]
    WrongType { expected: &'static str },

    #[error("field required")]
    Missing,

    #[error("{0}")]
    Malformed(String),
}

impl ValidationError {
    pub fn new(field: impl Into<Cow<'static, str>>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::new(field, ValidationReason::Missing)
    }

    /// The body could not be decoded at all (bad JSON, empty body, ...).
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new("body", ValidationReason::Malformed(detail.into()))
    }
}
