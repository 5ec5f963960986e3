//! Error taxonomy for Entry Service operations.
//!
//! [`ServiceError`] is what every service operation returns. Validation and
//! not-found errors are reported before any side effect; store and export
//! failures surface as-is. Generator unavailability is *not* part of this
//! taxonomy — it is recovered inside the service via the fallback policy and
//! never fails an operation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request validation failed. No entry was created or modified.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced entry does not exist.
    #[error("entry {0} not found")]
    NotFound(i64),

    /// A range export matched no entries.
    #[error("no entries found for export range {0}")]
    EmptyRange(String),

    /// SQLite failure. Fatal to the operation, surfaced verbatim.
    #[error("storage error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The shared database connection was poisoned by a panicking thread.
    #[error("database lock poisoned")]
    StorePoisoned,

    /// I/O failure while writing an export file. Entry state is unaffected.
    #[error("export to {path} failed: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;
