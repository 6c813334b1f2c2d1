use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors raised by [`DatabaseInstance`](crate::DatabaseInstance).
///
/// Engine failures are carried unchanged in [`Error::Sqlite`], so callers can
/// match on the inner `rusqlite::Error` exactly as they would without the
/// wrapper.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Primary SQLite result code, when the engine reported one.
    pub fn sqlite_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => Some(err.code),
            _ => None,
        }
    }

    /// Extended SQLite result code, e.g. `SQLITE_CONSTRAINT_FOREIGNKEY`.
    pub fn sqlite_extended_code(&self) -> Option<i32> {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => Some(err.extended_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
