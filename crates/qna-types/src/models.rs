use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Users carry nothing but their id, so equality is id equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /questions/{id}`. Serializes as a two-element array;
/// a missing question is `[null, null]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionThread(pub Option<Question>, pub Option<Vec<Answer>>);

impl QuestionThread {
    pub fn missing() -> Self {
        Self(None, None)
    }
}
