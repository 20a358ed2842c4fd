//! # bank-core: Pure Business Logic for Simple Bank
//!
//! This crate is the **heart** of the banking terminal. It contains the card
//! issuance engine, the account balance rules and the value types they share,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Simple Bank Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Terminal session (apps/terminal)                │   │
//! │  │   Main menu ──► Log in ──► Account menu ──► Transfer / Close   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bank-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   card    │  │   money   │  │ issuance  │  │ validation│  │   │
//! │  │   │   Card    │  │   Money   │  │  Luhn     │  │ well-     │  │   │
//! │  │   │   Pin     │  │  Account  │  │  Factory  │  │ formed    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bank-db (CardStore: SQLite / memory)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (cents)
//! - [`account`] - Account balance with deposit/withdraw rules
//! - [`card`] - Card, card number and PIN types
//! - [`issuance`] - Checksum engine and card factory
//! - [`validation`] - Parsing and structural checks for user input
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bank_core::issuance::{compute_checksum, validate, ISSUER_PREFIX};
//!
//! assert_eq!(compute_checksum(ISSUER_PREFIX, 844_943_340), 3);
//! assert!(validate("4000008449433403"));
//! assert!(!validate("4000008449433404"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod account;
pub mod card;
pub mod error;
pub mod issuance;
pub mod money;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use account::Account;
pub use card::{Card, CardNumber, Pin};
pub use error::{CoreError, CoreResult, ValidationError};
pub use issuance::{CardFactory, ISSUER_PREFIX};
pub use money::Money;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of digits in a card number (prefix + sequence + checksum).
pub const CARD_NUMBER_LEN: usize = 16;

/// Number of digits in the issuer identification number.
pub const ISSUER_PREFIX_LEN: usize = 6;

/// Number of digits in the customer sequence number.
pub const SEQUENCE_LEN: usize = 9;

/// Largest PIN value. PINs are drawn from `0..=MAX_PIN`.
pub const MAX_PIN: u16 = 9999;
