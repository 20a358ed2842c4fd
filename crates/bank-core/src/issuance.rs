//! # Card Issuance
//!
//! Checksum computation and the pure half of card issuance. The store-backed
//! half (reading the highest sequence, persisting the new card) lives in the
//! terminal's `CardIssuer` service.
//!
//! ## Checksum Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Digits of prefix ++ sequence, indexed from the LEFT starting at 0:    │
//! │                                                                         │
//! │  index   0  1  2  3  4  5  6  7  8  9 10 11 12 13 14                   │
//! │  digit   4  0  0  0  0  0  8  4  4  9  4  3  3  4  0                   │
//! │  even?   ×2    ×2    ×2    ×2    ×2    ×2    ×2    ×2                  │
//! │  value   8  0  0  0  0  0  7  4  8  9  8  3  6  4  0   (16 → 7)        │
//! │                                                                         │
//! │  sum = 57          checksum = (10 - 57 % 10) % 10 = 3                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Doubling is anchored at the left edge of the 15 digits, not the right.
//! Issued numbers depend on this, so it must not be "fixed" to the usual
//! right-to-left convention.

use rand::Rng;

use crate::card::{Card, CardNumber, Pin};
use crate::error::{CoreError, CoreResult};
use crate::{CARD_NUMBER_LEN, MAX_PIN};

/// Issuer identification number shared by every card of this bank.
pub const ISSUER_PREFIX: u32 = 400_000;

/// Largest 9-digit sequence number.
pub const MAX_SEQUENCE: u32 = 999_999_999;

/// Computes the checksum digit for `issuer_prefix ++ sequence`.
///
/// The prefix is rendered with 6 digits and the sequence with 9, both
/// zero-padded.
///
/// ## Example
/// ```rust
/// use bank_core::issuance::compute_checksum;
///
/// assert_eq!(compute_checksum(400_000, 844_943_340), 3);
/// assert_eq!(compute_checksum(400_000, 493_832_089), 6);
/// ```
pub fn compute_checksum(issuer_prefix: u32, sequence: u32) -> u8 {
    let payload = format!("{:06}{:09}", issuer_prefix, sequence);
    checksum_digit(payload.as_bytes())
}

/// Checks that a 16-digit number carries the right checksum digit.
///
/// Anything that is not exactly 16 ASCII digits is invalid.
///
/// ## Example
/// ```rust
/// use bank_core::issuance::validate;
///
/// assert!(validate("4000008449433403"));
/// assert!(!validate("4010008449433403"));
/// assert!(!validate("4000008449433404"));
/// assert!(!validate("400000844943340"));
/// ```
pub fn validate(number: &str) -> bool {
    let bytes = number.as_bytes();
    if bytes.len() != CARD_NUMBER_LEN || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let (payload, check) = bytes.split_at(CARD_NUMBER_LEN - 1);
    checksum_digit(payload) == check[0] - b'0'
}

/// Checksum over ASCII digits, doubling every even index from the left.
fn checksum_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, byte)| {
            let digit = u32::from(byte - b'0');
            if index % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    ((10 - sum % 10) % 10) as u8
}

/// Draws a PIN uniformly from `0..=9999`.
pub fn random_pin<R: Rng + ?Sized>(rng: &mut R) -> Pin {
    Pin::from_value_unchecked(rng.gen_range(0..=MAX_PIN))
}

// =============================================================================
// Card Factory
// =============================================================================

/// Builds new cards for one issuer prefix.
///
/// ## Issuance Flow
/// ```text
/// highest stored sequence (0 if none)
///      │
///      ▼  + 1
/// next sequence ──► checksum ──► 16-digit number ──► random PIN ──► Card
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardFactory {
    issuer_prefix: u32,
}

impl Default for CardFactory {
    fn default() -> Self {
        CardFactory::new()
    }
}

impl CardFactory {
    /// Factory for [`ISSUER_PREFIX`].
    pub const fn new() -> Self {
        CardFactory {
            issuer_prefix: ISSUER_PREFIX,
        }
    }

    /// Sequence following `highest_sequence`.
    pub fn next_sequence(&self, highest_sequence: u32) -> CoreResult<u32> {
        match highest_sequence.checked_add(1) {
            Some(next) if next <= MAX_SEQUENCE => Ok(next),
            _ => Err(CoreError::SequenceExhausted { max: MAX_SEQUENCE }),
        }
    }

    /// Number for a given sequence, checksum included.
    pub fn number_for(&self, sequence: u32) -> CardNumber {
        let checksum = compute_checksum(self.issuer_prefix, sequence);
        CardNumber::from_parts(self.issuer_prefix, sequence, checksum)
    }

    /// Builds the card that follows `highest_sequence`, with a random PIN and
    /// an empty account. Nothing is persisted here.
    pub fn next_card<R: Rng + ?Sized>(&self, highest_sequence: u32, rng: &mut R) -> CoreResult<Card> {
        let sequence = self.next_sequence(highest_sequence)?;
        Ok(Card::new(self.number_for(sequence), random_pin(rng)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_known_checksums() {
        assert_eq!(compute_checksum(400_000, 844_943_340), 3);
        assert_eq!(compute_checksum(400_000, 493_832_089), 6);
        assert_eq!(compute_checksum(400_000, 157_869_248), 5);
        assert_eq!(compute_checksum(400_000, 1), 0);
        assert_eq!(compute_checksum(400_000, 2), 8);
    }

    #[test]
    fn test_validate() {
        assert!(validate("4000008449433403"));
        assert!(validate("4000004938320896"));
        assert!(!validate("4010008449433403"));
        assert!(!validate("4000008449433404"));
    }

    #[test]
    fn test_validate_rejects_other_lengths_and_non_digits() {
        assert!(!validate(""));
        assert!(!validate("400000844943340"));
        assert!(!validate("40000084494334030"));
        assert!(!validate("400000844943340x"));
    }

    #[test]
    fn test_sequential_numbers_from_empty_store() {
        let factory = CardFactory::new();
        let mut rng = StdRng::seed_from_u64(7);

        let first = factory.next_card(0, &mut rng).unwrap();
        assert_eq!(first.number().as_str(), "4000000000000010");
        assert_eq!(first.number().sequence(), 1);

        let second = factory
            .next_card(first.number().sequence(), &mut rng)
            .unwrap();
        assert_eq!(second.number().as_str(), "4000000000000028");
        assert_ne!(first.number(), second.number());
    }

    #[test]
    fn test_sequence_exhaustion() {
        let factory = CardFactory::new();
        assert_eq!(factory.next_sequence(MAX_SEQUENCE - 1).unwrap(), MAX_SEQUENCE);
        assert_eq!(
            factory.next_sequence(MAX_SEQUENCE),
            Err(CoreError::SequenceExhausted { max: MAX_SEQUENCE })
        );
        assert!(factory.next_sequence(u32::MAX).is_err());
    }

    #[test]
    fn test_new_cards_start_empty_with_pin_in_range() {
        let factory = CardFactory::new();
        let mut rng = StdRng::seed_from_u64(42);
        for highest in 0..2_000 {
            let card = factory.next_card(highest, &mut rng).unwrap();
            assert!(card.pin().value() <= MAX_PIN);
            assert_eq!(card.number().issuer_prefix(), ISSUER_PREFIX);
            assert_eq!(card.number().as_str().len(), CARD_NUMBER_LEN);
            assert!(card.account().balance().is_zero());
        }
    }

    proptest! {
        #[test]
        fn prop_issued_numbers_validate(sequence in 1u32..=MAX_SEQUENCE) {
            let number = CardFactory::new().number_for(sequence);
            prop_assert!(validate(number.as_str()));
            prop_assert_eq!(number.sequence(), sequence);
        }

        #[test]
        fn prop_wrong_check_digit_fails(sequence in 1u32..=MAX_SEQUENCE, bump in 1u8..10) {
            let number = CardFactory::new().number_for(sequence);
            let mut digits = number.as_str().as_bytes().to_vec();
            digits[15] = b'0' + (digits[15] - b'0' + bump) % 10;
            let tampered = String::from_utf8(digits).unwrap();
            prop_assert!(!validate(&tampered));
        }
    }
}
