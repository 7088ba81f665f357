//! Field-for-field translation between validation shapes and storage rows.

use chrono::{DateTime, Utc};
use tracing::warn;

use qna_db::models::{AnswerRow, QuestionRow, UserRow};
use qna_types::api::{TextInput, validate_answer_text, validate_question_text};
use qna_types::models::{Answer, Question, User};
use qna_types::timestamp;
use qna_types::{ValidationError, ValidationReason};

// -- Shape -> row --

pub fn user_row(user: User) -> UserRow {
    UserRow { id: user.id }
}

pub fn question_row(question: Question) -> QuestionRow {
    QuestionRow {
        id: question.id,
        text: question.text,
        created_at: Some(format_timestamp(question.created_at)),
    }
}

pub fn answer_row(answer: Answer) -> AnswerRow {
    AnswerRow {
        id: answer.id,
        question_id: answer.question_id,
        user_id: answer.user_id,
        text: answer.text,
        created_at: Some(format_timestamp(answer.created_at)),
    }
}

// -- Row -> shape --

pub fn question_from_row(row: QuestionRow) -> Result<Question, ValidationError> {
    Ok(Question {
        id: row.id,
        text: validate_question_text(&row.text)?,
        created_at: parse_timestamp(row.created_at.as_deref())?,
    })
}

pub fn answer_from_row(row: AnswerRow) -> Result<Answer, ValidationError> {
    Ok(Answer {
        id: row.id,
        question_id: row.question_id,
        user_id: row.user_id,
        text: validate_answer_text(TextInput::Text(row.text))?,
        created_at: parse_timestamp(row.created_at.as_deref())?,
    })
}

/// Converts every row that passes validation; the rest are logged and skipped.
pub fn valid_questions(rows: Vec<QuestionRow>) -> Vec<Question> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            question_from_row(row)
                .inspect_err(|e| warn!(question_id = id, error = %e, "Dropping invalid question"))
                .ok()
        })
        .collect()
}

pub fn valid_answers(rows: Vec<AnswerRow>) -> Vec<Answer> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            answer_from_row(row)
                .inspect_err(|e| warn!(answer_id = id, error = %e, "Dropping invalid answer"))
                .ok()
        })
        .collect()
}

// -- Timestamps --

fn format_timestamp(ts: DateTime<Utc>) -> String {
    timestamp::format(ts)
}

fn parse_timestamp(raw: Option<&str>) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.ok_or(ValidationError::missing("created_at"))?;

    timestamp::parse(raw).map_err(|e| {
        ValidationError::new(
            "created_at",
            ValidationReason::Malformed(format!("'{raw}': {e}")),
        )
    })
}
