//! Error types for the clinic calendar.

use thiserror::Error;

use crate::form::FormError;

/// Errors that can occur in clinic operations.
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("Date out of range: {0}")]
    OutOfRange(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Form(#[from] FormError),
}

/// Result type alias for clinic operations.
pub type ClinicResult<T> = Result<T, ClinicError>;
