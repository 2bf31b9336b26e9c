use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors produced by the mapping engine and the data access facade.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller named a table that is not the model's own table.
    #[error("table `{actual}` does not match the model table `{expected}`")]
    SchemaMismatch { expected: String, actual: String },

    #[error("field `{0}` is not declared on this model")]
    UnknownField(String),

    #[error("`{0}` is not a valid SQL identifier")]
    InvalidIdentifier(String),

    #[error("`{0}` is not a sort direction, expected ASC or DESC")]
    InvalidDirection(String),

    #[error("database file `{}` does not exist", path.display())]
    DatabaseNotFound { path: PathBuf },

    #[error("could not open database: {0}")]
    Connection(#[source] rusqlite::Error),

    #[error("constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),

    #[error("statement failed: {0}")]
    Statement(#[source] rusqlite::Error),

    #[error("transaction failed: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("column `{column}` holds a value that cannot be stored as {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Reading a schema script or removing a database file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One record of a batch insert failed; records before `index` were written.
    #[error("batch insert stopped at record {index}: {source}")]
    BatchInsert {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Maps a backend error raised while running a statement, keeping
    /// constraint failures apart from everything else.
    pub(crate) fn statement(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Error::ConstraintViolation(err),
            _ => Error::Statement(err),
        }
    }

    /// `false` for programmer errors (wrong table, unknown field, bad
    /// identifier); these are never fixed by retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::SchemaMismatch { .. }
            | Error::UnknownField(_)
            | Error::InvalidIdentifier(_)
            | Error::InvalidDirection(_) => {
                false
            }
            Error::BatchInsert { source, .. } => source.is_recoverable(),
            _ => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
