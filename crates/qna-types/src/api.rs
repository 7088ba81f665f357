use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationReason};
use crate::models::{Answer, Question, User};
use crate::timestamp;

pub const USER_ID_MAX_LEN: usize = 36;
pub const QUESTION_TEXT_MIN_LEN: usize = 2;
pub const ANSWER_TEXT_MIN_LEN: usize = 1;

// -- Confirmation --

/// Echoed back by every successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub ok: bool,
    pub status_code: u16,
}

impl Confirmation {
    pub fn new(status_code: u16) -> Self {
        Self {
            ok: true,
            status_code,
        }
    }
}

// -- Free-form text --

/// Raw `text` value as it arrived on the wire. Type checks happen in
/// validation so a wrong type reports the field instead of a decode error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

// -- Users --

/// Required fields are optional here so a missing one is reported by name
/// from `validate` rather than as an opaque decode error.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub id: Option<String>,
}

impl UserPayload {
    pub fn validate(self) -> Result<User, ValidationError> {
        let id = self.id.ok_or(ValidationError::missing("id"))?;
        Ok(User {
            id: validate_user_id(&id)?,
        })
    }
}

// -- Questions --

#[derive(Debug, Deserialize)]
pub struct QuestionPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub text: Option<TextInput>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuestionPayload {
    /// `now` stands in for a missing `created_at`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Question, ValidationError> {
        let id = self.id.ok_or(ValidationError::missing("id"))?;
        let text = self.text.ok_or(ValidationError::missing("text"))?;

        let text = match text {
            TextInput::Text(s) => validate_question_text(&s)?,
            _ => {
                return Err(ValidationError::new(
                    "text",
                    ValidationReason::WrongType { expected: "string" },
                ));
            }
        };

        Ok(Question {
            id,
            text,
            created_at: self.created_at.unwrap_or(now),
        })
    }
}

// -- Answers --

#[derive(Debug, Deserialize)]
pub struct AnswerPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub question_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub text: Option<TextInput>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AnswerPayload {
    /// A `question_id` from the route takes precedence over the body.
    pub fn validate(
        self,
        question_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Answer, ValidationError> {
        let id = self.id.ok_or(ValidationError::missing("id"))?;
        let question_id = question_id
            .or(self.question_id)
            .ok_or(ValidationError::missing("question_id"))?;
        let user_id = self.user_id.ok_or(ValidationError::missing("user_id"))?;
        let text = self.text.ok_or(ValidationError::missing("text"))?;

        Ok(Answer {
            id,
            question_id,
            user_id: user_id.trim().to_string(),
            text: validate_answer_text(text)?,
            created_at: self.created_at.unwrap_or(now),
        })
    }
}

// -- Field rules --

pub fn validate_user_id(id: &str) -> Result<String, ValidationError> {
    let id = id.trim();
    let len = id.chars().count();
    if len < 1 {
        return Err(ValidationError::new(
            "id",
            ValidationReason::TooShort { min: 1 },
        ));
    }
    if len > USER_ID_MAX_LEN {
        return Err(ValidationError::new(
            "id",
            ValidationReason::TooLong {
                max: USER_ID_MAX_LEN,
            },
        ));
    }
    Ok(id.to_string())
}

pub fn validate_question_text(text: &str) -> Result<String, ValidationError> {
    min_len("text", text, QUESTION_TEXT_MIN_LEN)
}

/// Numbers are accepted and stored in their decimal form. Booleans are not
/// numbers here and are rejected.
pub fn validate_answer_text(text: TextInput) -> Result<String, ValidationError> {
    match text {
        TextInput::Text(s) => min_len("text", &s, ANSWER_TEXT_MIN_LEN),
        TextInput::Number(n) => min_len("text", &n.to_string(), ANSWER_TEXT_MIN_LEN),
        TextInput::Other(_) => Err(ValidationError::new(
            "text",
            ValidationReason::WrongType {
                expected: "string or number",
            },
        )),
    }
}

fn min_len(field: &'static str, value: &str, min: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.chars().count() < min {
        return Err(ValidationError::new(field, ValidationReason::TooShort { min }));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(body: serde_json::Value) -> Result<Question, ValidationError> {
        serde_json::from_value::<QuestionPayload>(body)
            .unwrap()
            .validate(Utc::now())
    }

    fn answer(body: serde_json::Value) -> Result<Answer, ValidationError> {
        serde_json::from_value::<AnswerPayload>(body)
            .unwrap()
            .validate(None, Utc::now())
    }

    #[test]
    fn user_id_is_trimmed() {
        let user = UserPayload {
            id: Some("  u1 \n".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(user.id, "u1");
    }

    #[test]
    fn user_id_length_bounds() {
        let blank = UserPayload { id: Some("   ".into()) }.validate().unwrap_err();
        assert_eq!(blank.field, "id");
        assert_eq!(blank.reason, ValidationReason::TooShort { min: 1 });

        assert!(UserPayload { id: Some("a".repeat(36)) }.validate().is_ok());

        let long = UserPayload { id: Some("a".repeat(37)) }.validate().unwrap_err();
        assert_eq!(long.reason, ValidationReason::TooLong { max: 36 });
    }

    #[test]
    fn question_text_boundary() {
        let short = question(json!({"id": 1, "text": "Q"})).unwrap_err();
        assert_eq!(short.field, "text");
        assert_eq!(short.reason, ValidationReason::TooShort { min: 2 });

        let ok = question(json!({"id": 1, "text": "Q?"})).unwrap();
        assert_eq!(ok.text, "Q?");
    }

    #[test]
    fn question_text_whitespace_does_not_count() {
        let err = question(json!({"id": 1, "text": "  Q  "})).unwrap_err();
        assert_eq!(err.reason, ValidationReason::TooShort { min: 2 });
    }

    #[test]
    fn question_text_must_be_a_string() {
        let err = question(json!({"id": 1, "text": 42})).unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::WrongType { expected: "string" }
        );

        let err = question(json!({"id": 1})).unwrap_err();
        assert_eq!(err.reason, ValidationReason::Missing);
    }

    #[test]
    fn question_created_at_defaults_to_now() {
        let before = Utc::now();
        let q = question(json!({"id": 7, "text": "When?"})).unwrap();
        assert!(q.created_at >= before);

        let q = question(json!({
            "id": 7,
            "text": "When?",
            "created_at": "2024-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(q.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[test]
    fn zoneless_created_at_is_utc() {
        let q = question(json!({
            "id": 7,
            "text": "When?",
            "created_at": "2024-01-02T03:04:05"
        }))
        .unwrap();
        assert_eq!(q.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");

        let err = serde_json::from_value::<QuestionPayload>(json!({
            "id": 7,
            "text": "When?",
            "created_at": "soon"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'soon'"), "{err}");
    }

    #[test]
    fn missing_fields_are_named() {
        let err = UserPayload { id: None }.validate().unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.reason, ValidationReason::Missing);

        let err = question(json!({"text": "Q?"})).unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.reason, ValidationReason::Missing);

        let err = answer(json!({"id": 1, "question_id": 1, "text": "A"})).unwrap_err();
        assert_eq!(err.field, "user_id");
        assert_eq!(err.reason, ValidationReason::Missing);
    }

    #[test]
    fn answer_text_accepts_numbers() {
        let a = answer(json!({"id": 1, "question_id": 1, "user_id": "u1", "text": 42})).unwrap();
        assert_eq!(a.text, "42");

        let a = answer(json!({"id": 1, "question_id": 1, "user_id": "u1", "text": 4.5})).unwrap();
        assert_eq!(a.text, "4.5");
    }

    #[test]
    fn answer_text_rejects_other_types() {
        for text in [json!(true), json!(["a"]), json!({"a": 1})] {
            let err = answer(json!({"id": 1, "question_id": 1, "user_id": "u1", "text": text}))
                .unwrap_err();
            assert_eq!(err.field, "text");
            assert!(matches!(err.reason, ValidationReason::WrongType { .. }));
        }

        let err = answer(json!({"id": 1, "question_id": 1, "user_id": "u1", "text": " "}))
            .unwrap_err();
        assert_eq!(err.reason, ValidationReason::TooShort { min: 1 });
    }

    #[test]
    fn answer_route_question_id_wins() {
        let payload: AnswerPayload = serde_json::from_value(json!({
            "id": 3,
            "question_id": 99,
            "user_id": " u1 ",
            "text": "A"
        }))
        .unwrap();
        let a = payload.validate(Some(5), Utc::now()).unwrap();
        assert_eq!(a.question_id, 5);
        assert_eq!(a.user_id, "u1");
    }

    #[test]
    fn answer_needs_a_question() {
        let err = answer(json!({"id": 1, "user_id": "u1", "text": "A"})).unwrap_err();
        assert_eq!(err.field, "question_id");
        assert_eq!(err.reason, ValidationReason::Missing);
    }
}
