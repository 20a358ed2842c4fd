//! # Card Types
//!
//! A card is the identity of a customer: a 16-digit number, a PIN and the
//! account it owns.
//!
//! ## Card Number Layout
//! ```text
//!   4 0 0 0 0 0   8 4 4 9 4 3 3 4 0   3
//!   └────┬────┘   └───────┬───────┘   │
//!   issuer prefix      sequence     checksum
//!    (6 digits)       (9 digits)    (1 digit)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::account::Account;
use crate::error::{CoreError, ValidationError};
use crate::{CARD_NUMBER_LEN, ISSUER_PREFIX_LEN, MAX_PIN};

// =============================================================================
// Card Number
// =============================================================================

/// A 16-digit card number.
///
/// Construction only checks shape (16 ASCII digits). Whether the checksum
/// digit is right is a separate question, answered by
/// [`CardNumber::has_valid_checksum`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardNumber(String);

impl CardNumber {
    /// Parses a card number, ignoring surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let digits = input.trim();
        if digits.is_empty() {
            return Err(ValidationError::Required {
                field: "card number".to_string(),
            });
        }
        if digits.len() != CARD_NUMBER_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "card number".to_string(),
                reason: format!("must be exactly {} digits", CARD_NUMBER_LEN),
            });
        }
        Ok(CardNumber(digits.to_string()))
    }

    /// Assembles a number from its parts.
    pub(crate) fn from_parts(issuer_prefix: u32, sequence: u32, checksum: u8) -> Self {
        CardNumber(format!("{:06}{:09}{}", issuer_prefix, sequence, checksum))
    }

    /// The digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Issuer identification number (first 6 digits).
    pub fn issuer_prefix(&self) -> u32 {
        self.digits_value(0, ISSUER_PREFIX_LEN)
    }

    /// Customer sequence number (middle 9 digits).
    pub fn sequence(&self) -> u32 {
        self.digits_value(ISSUER_PREFIX_LEN, CARD_NUMBER_LEN - 1)
    }

    /// Checksum digit (last digit).
    pub fn checksum(&self) -> u8 {
        self.0.as_bytes()[CARD_NUMBER_LEN - 1] - b'0'
    }

    /// Whether the checksum digit matches the other 15 digits.
    pub fn has_valid_checksum(&self) -> bool {
        crate::issuance::validate(&self.0)
    }

    fn digits_value(&self, start: usize, end: usize) -> u32 {
        self.0.as_bytes()[start..end]
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CardNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardNumber::parse(s)
    }
}

impl TryFrom<String> for CardNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CardNumber::parse(&value)
    }
}

impl From<CardNumber> for String {
    fn from(number: CardNumber) -> Self {
        number.0
    }
}

// =============================================================================
// PIN
// =============================================================================

/// A PIN in `0..=9999`.
///
/// Compared as an integer, so `"42"` and `"0042"` are the same PIN; always
/// displayed with four digits so `0000` never collapses to `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Pin(u16);

impl Pin {
    /// Creates a PIN from its numeric value.
    pub fn new(value: u16) -> Result<Self, ValidationError> {
        if value > MAX_PIN {
            return Err(ValidationError::OutOfRange {
                field: "pin".to_string(),
                min: 0,
                max: i64::from(MAX_PIN),
            });
        }
        Ok(Pin(value))
    }

    /// Parses 1 to 4 digits.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let digits = input.trim();
        if digits.is_empty() {
            return Err(ValidationError::Required {
                field: "pin".to_string(),
            });
        }
        if digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "pin".to_string(),
                reason: "must be at most 4 digits".to_string(),
            });
        }
        let value = digits
            .bytes()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));
        Pin::new(value)
    }

    /// Wraps a value already known to be in range.
    pub(crate) const fn from_value_unchecked(value: u16) -> Self {
        Pin(value)
    }

    /// Numeric value.
    #[inline]
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for Pin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pin::parse(s)
    }
}

impl TryFrom<u16> for Pin {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Pin::new(value)
    }
}

impl From<Pin> for u16 {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}

// =============================================================================
// Card
// =============================================================================

/// A card and the account it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    number: CardNumber,
    pin: Pin,
    account: Account,
}

impl Card {
    /// Creates a card with an empty account.
    pub fn new(number: CardNumber, pin: Pin) -> Self {
        Card::with_account(number, pin, Account::new())
    }

    /// Creates a card around an existing account (used when loading from storage).
    pub fn with_account(number: CardNumber, pin: Pin, account: Account) -> Self {
        Card {
            number,
            pin,
            account,
        }
    }

    pub fn number(&self) -> &CardNumber {
        &self.number
    }

    pub fn pin(&self) -> Pin {
        self.pin
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_mut(&mut self) -> &mut Account {
        &mut self.account
    }

    /// Checks a candidate PIN against this card.
    pub fn verify_pin(&self, candidate: Pin) -> Result<(), CoreError> {
        if self.pin == candidate {
            Ok(())
        } else {
            Err(CoreError::WrongPin(self.number.to_string()))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_number_parts() {
        let number = CardNumber::parse("4000001578692485").unwrap();
        assert_eq!(number.issuer_prefix(), 400_000);
        assert_eq!(number.sequence(), 157_869_248);
        assert_eq!(number.checksum(), 5);
        assert!(number.has_valid_checksum());
    }

    #[test]
    fn test_card_number_parse_rejects_bad_shape() {
        assert!(matches!(
            CardNumber::parse("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(CardNumber::parse("400000844943340").is_err());
        assert!(CardNumber::parse("40000084494334031").is_err());
        assert!(CardNumber::parse("40000084494334a3").is_err());
        assert!(CardNumber::parse(" 4000008449433403\n").is_ok());
    }

    #[test]
    fn test_from_parts_zero_pads() {
        let number = CardNumber::from_parts(400_000, 1, 0);
        assert_eq!(number.as_str(), "4000000000000010");
        assert_eq!(number.sequence(), 1);
    }

    #[test]
    fn test_pin_display_keeps_leading_zeros() {
        assert_eq!(Pin::new(0).unwrap().to_string(), "0000");
        assert_eq!(Pin::new(42).unwrap().to_string(), "0042");
        assert_eq!(Pin::new(8641).unwrap().to_string(), "8641");
    }

    #[test]
    fn test_pin_parse_compares_as_integer() {
        assert_eq!(Pin::parse("0000").unwrap(), Pin::new(0).unwrap());
        assert_eq!(Pin::parse("0").unwrap(), Pin::new(0).unwrap());
        assert_eq!(Pin::parse("0042").unwrap(), Pin::parse("42").unwrap());
        assert!(Pin::parse("").is_err());
        assert!(Pin::parse("12345").is_err());
        assert!(Pin::parse("12a4").is_err());
        assert!(Pin::new(10_000).is_err());
    }

    #[test]
    fn test_pin_deserialize_checks_range() {
        use serde::de::value::{Error as DeError, U16Deserializer};
        use serde::de::IntoDeserializer;

        let zero: U16Deserializer<DeError> = 0u16.into_deserializer();
        assert_eq!(Pin::deserialize(zero).unwrap().to_string(), "0000");

        let too_big: U16Deserializer<DeError> = 10_000u16.into_deserializer();
        assert!(Pin::deserialize(too_big).is_err());
    }

    #[test]
    fn test_verify_pin() {
        let card = Card::new(
            CardNumber::parse("4000001578692485").unwrap(),
            Pin::new(8641).unwrap(),
        );
        assert!(card.verify_pin(Pin::new(8641).unwrap()).is_ok());
        assert_eq!(
            card.verify_pin(Pin::new(1).unwrap()),
            Err(CoreError::WrongPin("4000001578692485".to_string()))
        );
        assert!(card.account().balance().is_zero());
    }
}
