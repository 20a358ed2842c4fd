//! # Validation Module
//!
//! Input validation utilities for terminal input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE - text → domain value                            │
//! │  ├── parse_amount: decimal text, exact                                 │
//! │  └── is_well_formed: 16 digits + issuer prefix                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain rules (Account, issuance::validate)                   │
//! │  ├── negative amounts, insufficient funds                              │
//! │  └── checksum digit                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage (SQLite)                                             │
//! │  └── UNIQUE card number, NOT NULL columns                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::issuance::ISSUER_PREFIX;
use crate::{CARD_NUMBER_LEN, ISSUER_PREFIX_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Structural check: exactly 16 digits starting with the issuer prefix.
///
/// Says nothing about the checksum digit. Surrounding whitespace counts
/// against the length; trimming is up to whoever reads the input.
///
/// ## Example
/// ```rust
/// use bank_core::validation::is_well_formed;
///
/// assert!(is_well_formed("4000008449433403"));
/// assert!(is_well_formed("4000008449433404")); // bad checksum, right shape
/// assert!(!is_well_formed("4010008449433403"));
/// ```
pub fn is_well_formed(number: &str) -> bool {
    number.len() == CARD_NUMBER_LEN
        && number.bytes().all(|b| b.is_ascii_digit())
        && number[..ISSUER_PREFIX_LEN] == format!("{:06}", ISSUER_PREFIX)
}

/// Parses a decimal amount typed by the user.
///
/// Sign is preserved; rejecting negative amounts is the account's job, so
/// that deposit and withdraw report `InvalidAmount` themselves.
///
/// ## Example
/// ```rust
/// use bank_core::validation::parse_amount;
///
/// assert!(parse_amount("12.50").is_ok());
/// assert!(parse_amount("-3").is_ok());
/// assert!(parse_amount("ten").is_err());
/// ```
pub fn parse_amount(input: &str) -> ValidationResult<Decimal> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: "amount".to_string(),
        });
    }

    Decimal::from_str(input).map_err(|_| ValidationError::InvalidFormat {
        field: "amount".to_string(),
        reason: "must be a decimal number".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("4000008449433403"));
        assert!(is_well_formed("4000000000000000"));
        assert!(!is_well_formed("400000844943340"));
        assert!(!is_well_formed("40000084494334031"));
        assert!(!is_well_formed("5000008449433403"));
        assert!(!is_well_formed("40000084494334a3"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed(" 4000008449433403 "));
        assert!(!is_well_formed("4000008449433403\n"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100").unwrap(), Decimal::new(100, 0));
        assert_eq!(parse_amount(" 0.136 ").unwrap(), Decimal::new(136, 3));
        assert_eq!(parse_amount("-10").unwrap(), Decimal::new(-10, 0));

        assert!(matches!(
            parse_amount(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_amount("1,000"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(parse_amount("abc").is_err());
    }
}
