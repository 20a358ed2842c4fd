//! # Terminal Error Type
//!
//! What the session loop sees when something goes wrong.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Terminal                           │
//! │                                                                         │
//! │  Service call (Ledger::transfer, Authenticator::authenticate, ...)     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CoreError? ──── recoverable ──► message, back to the menu             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  DbError / ConfigError / io::Error ──── fatal ──► exit code 1          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use bank_core::{CoreError, ValidationError};
use bank_db::DbError;
use thiserror::Error;

/// Errors surfaced by terminal services and the session.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Ledger, card or authentication rule. The session reports it and
    /// carries on.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Db(#[from] DbError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading from or writing to the console failed.
    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl TerminalError {
    /// True for errors the session can report and continue from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TerminalError::Core(_))
    }
}

impl From<ValidationError> for TerminalError {
    fn from(err: ValidationError) -> Self {
        TerminalError::Core(CoreError::Validation(err))
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Result type for terminal operations.
pub type TerminalResult<T> = Result<T, TerminalError>;
