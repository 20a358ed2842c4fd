//! # Money Module
//!
//! Provides the `Money` type for handling account balances safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Balances are stored as whole cents (i64).                             │
//! │                                                                         │
//! │  User types "12.150253132"                                             │
//! │       │                                                                 │
//! │       ▼  rust_decimal parse (exact, no float)                          │
//! │  Decimal 12.150253132                                                  │
//! │       │                                                                 │
//! │       ▼  round to 2 dp, half-to-even                                   │
//! │  Decimal 12.15  ──►  Money(1215)                                       │
//! │                                                                         │
//! │  From here on every operation is exact integer arithmetic.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bank_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Money::from_cents(1099);
//! assert_eq!(price.to_string(), "10.99");
//!
//! let rounded = Money::from_decimal(Decimal::new(136, 3)).unwrap(); // 0.136
//! assert_eq!(rounded.cents(), 14);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Number of minor-unit digits (cents).
pub const MINOR_UNIT_DIGITS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Arithmetic stays total; the non-negative balance rule
///   lives in [`Account`](crate::account::Account), not here
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use bank_core::money::Money;
    ///
    /// let balance = Money::from_cents(6000); // 60.00
    /// assert_eq!(balance.cents(), 6000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount, rounding to cents.
    ///
    /// Rounding is half-to-even (`0.125` → `0.12`, `0.135` → `0.14`).
    /// Returns `None` when the amount does not fit in i64 cents.
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let rounded =
            amount.round_dp_with_strategy(MINOR_UNIT_DIGITS, RoundingStrategy::MidpointNearestEven);
        rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
    }

    /// Returns the value as a decimal with two fractional digits.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_DIGITS)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds, returning `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
