//! Every failure the store can report.
//!
//! Constraint errors are raised by the operation that detects them and are
//! never retried internally; the caller decides whether to try again with
//! corrected data. Disk errors are passed through untouched.

use serde_json::Value;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("err: does not exist: table ({0})")]
    TableNotFound(String),

    #[error("err: already exists: table ({0}); drop it first")]
    TableExists(String),

    #[error("err: column name must be unique; there is already a column named '{0}'")]
    DuplicateColumn(String),

    #[error("err: unexpected type ({actual}) for column {column}; expecting a {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("err: the value {value} for column ({column}) must be unique")]
    UniqueConstraintViolation { column: String, value: Value },

    #[error("err: column ({0}) is undefined and is a required field")]
    RequiredField(String),

    #[error("err: validation failed for column ({column}) data ({value})")]
    ValidationFunction { column: String, value: Value },

    #[error("err: schema for table ({0}) already exists; drop the table first")]
    SchemaExists(String),

    #[error("err: attempt to write into table ({0}) failed; no schema is registered for it")]
    InsertWithoutSchema(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the error came from the validation engine rather than from
    /// table lookup or the disk.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::TypeMismatch { .. }
                | StoreError::UniqueConstraintViolation { .. }
                | StoreError::RequiredField(_)
                | StoreError::ValidationFunction { .. }
        )
    }
}
