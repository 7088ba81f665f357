use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} '{id}' already exists")]
    AlreadyExists { resource: &'static str, id: String },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock poisoned")]
    Poisoned,
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// True for storage faults, as opposed to a missing or duplicate row.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Sqlite(_) | Self::Poisoned)
    }
}

pub type DbResult<T> = Result<T, DbError>;
