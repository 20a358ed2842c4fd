//! # Error Types
//!
//! Domain-specific error types for bank-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bank-core errors (this file)                                          │
//! │  ├── CoreError        - Ledger, card and authentication rules          │
//! │  └── ValidationError  - Input parsing failures                         │
//! │                                                                         │
//! │  bank-db errors (separate crate)                                       │
//! │  └── DbError          - Storage failures (fatal for a session)         │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── TerminalError    - What the session loop sees                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → TerminalError → user message      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amount, card number)
//! 3. Every `CoreError` is recoverable: the session reports it and carries on

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Amount is negative or cannot be represented in cents.
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: String },

    /// Withdrawal exceeds the balance.
    ///
    /// ## User Workflow
    /// ```text
    /// Transfer 1000 (balance 60)
    ///      │
    ///      ▼
    /// InsufficientFunds { requested: 1000.00, available: 60.00 }
    ///      │
    ///      ▼
    /// UI shows: "Not enough money!" (nothing was moved)
    /// ```
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Money, available: Money },

    /// No card with this number exists.
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// The PIN does not match the stored PIN.
    #[error("Wrong PIN for card {0}")]
    WrongPin(String),

    /// Card number fails the structural or checksum check.
    #[error("Malformed card number: {0}")]
    MalformedCardNumber(String),

    /// Source and target of a transfer are the same card.
    #[error("Cannot transfer from card {0} to itself")]
    SelfTransfer(String),

    /// Every 9-digit sequence number has been issued.
    #[error("No sequence numbers left (max {max})")]
    SequenceExhausted { max: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidAmount error from anything displayable.
    pub fn invalid_amount(amount: impl ToString) -> Self {
        CoreError::InvalidAmount {
            amount: amount.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when terminal input does not parse into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (non-digit characters, wrong length).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
