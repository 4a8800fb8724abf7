/*!
 * Error types for the verserecall library.
 *
 * Scoring is total and never fails; only the rehearsal scheduler and the
 * persistence collaborators surface errors. Definitions use the thiserror
 * crate, application glue converts them into `anyhow::Error`.
 */

use thiserror::Error;

/// Errors raised by a persistence collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A read was rejected by the backing store
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// A write was rejected by the backing store
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// A stored record could not be decoded
    #[error("Corrupt record {id}: {message}")]
    Corrupt {
        /// Identifier of the offending record
        id: String,
        /// Decoding failure
        message: String,
    },
}

/// Errors surfaced by the rehearsal scheduler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// No schedule exists with the given id
    #[error("Rehearsal schedule not found: {0}")]
    NotFound(String),

    /// The schedule was already completed and cannot be completed again
    #[error("Rehearsal schedule already completed: {0}")]
    AlreadyCompleted(String),

    /// The request was rejected before touching the store
    #[error("Invalid rehearsal request: {0}")]
    InvalidRequest(String),

    /// The persistence collaborator rejected a read or write
    #[error("Store failure: {0}")]
    StoreFailure(#[from] StoreError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the configuration layer
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the scheduler
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Error from a store used outside the scheduler
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
