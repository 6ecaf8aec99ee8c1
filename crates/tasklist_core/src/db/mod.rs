//! SQLite bootstrap for the task database.
//!
//! # Responsibility
//! - Open the database that backs the key-value store.
//! - Create the `kv_entries` table on first open.
//!
//! # Invariants
//! - The schema revision lives in `PRAGMA user_version`.
//! - A database written by a newer build is refused rather than rewritten.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::{open_db, open_db_in_memory, KV_SCHEMA_VERSION};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or bootstrapping the task database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File carries a `user_version` this build does not know.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "task database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "task database uses kv schema {found}; this build supports up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
