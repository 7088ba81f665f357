/// Database row types — these map directly to SQLite rows.
/// Distinct from qna-types API models to keep the DB layer independent.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    pub id: i64,
    pub text: String,
    /// RFC 3339 UTC text. `None` on insert lets the column default fill it.
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRow {
    pub id: i64,
    pub question_id: i64,
    pub user_id: String,
    pub text: String,
    pub created_at: Option<String>,
}
