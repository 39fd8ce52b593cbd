use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate {entity}: {detail}")]
    Conflict { entity: &'static str, detail: String },

    #[error("Invalid reference from {entity}: {detail}")]
    MissingReference { entity: &'static str, detail: String },

    #[error("Corrupt {table} row {id}: {detail}")]
    Corrupt {
        table: &'static str,
        id: i64,
        detail: String,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    pub fn conflict(entity: &'static str, detail: impl Into<String>) -> Self {
        PersistError::Conflict {
            entity,
            detail: detail.into(),
        }
    }

    pub fn missing_reference(entity: &'static str, detail: impl Into<String>) -> Self {
        PersistError::MissingReference {
            entity,
            detail: detail.into(),
        }
    }

    /// Classify a failed INSERT/UPDATE: unique and foreign-key violations become
    /// typed errors, everything else stays a database error.
    #[cfg(feature = "mysql")]
    pub(crate) fn on_write(entity: &'static str, err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return PersistError::conflict(entity, db_err.message());
            }
            if db_err.is_foreign_key_violation() {
                return PersistError::missing_reference(entity, db_err.message());
            }
        }
        PersistError::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
