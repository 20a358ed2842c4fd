//! # Account
//!
//! The balance owned by a card, and the only place it changes.
//!
//! ## Balance Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  deposit(amount)                  withdraw(amount)                      │
//! │  ───────────────                  ────────────────                      │
//! │  amount < 0 → InvalidAmount       amount < 0 → InvalidAmount            │
//! │  round to cents                   round to cents                        │
//! │  balance += amount                amount > balance → InsufficientFunds  │
//! │                                   balance -= amount                     │
//! │                                                                         │
//! │  On any error the balance is untouched.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// A non-negative balance.
///
/// Serialized as its balance in cents; deserializing goes through
/// [`Account::with_balance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Account {
    balance: Money,
}

impl Account {
    /// Creates an empty account.
    pub const fn new() -> Self {
        Account {
            balance: Money::zero(),
        }
    }

    /// Restores an account from a stored balance.
    ///
    /// Negative balances are rejected, so a corrupted row can never produce
    /// an account that violates the balance rule.
    pub fn with_balance(balance: Money) -> CoreResult<Self> {
        if balance.is_negative() {
            return Err(CoreError::invalid_amount(balance));
        }
        Ok(Account { balance })
    }

    /// Current balance.
    #[inline]
    pub const fn balance(&self) -> Money {
        self.balance
    }

    /// Adds `amount` (rounded to cents) to the balance.
    ///
    /// Returns the amount actually credited.
    pub fn deposit(&mut self, amount: Decimal) -> CoreResult<Money> {
        let amount = Self::validate_amount(amount)?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| CoreError::invalid_amount(amount))?;
        Ok(amount)
    }

    /// Removes `amount` (rounded to cents) from the balance.
    ///
    /// Returns the amount actually debited.
    pub fn withdraw(&mut self, amount: Decimal) -> CoreResult<Money> {
        let amount = Self::validate_amount(amount)?;
        if amount > self.balance {
            return Err(CoreError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance = self.balance - amount;
        Ok(amount)
    }

    fn validate_amount(amount: Decimal) -> CoreResult<Money> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CoreError::invalid_amount(amount));
        }
        Money::from_decimal(amount).ok_or_else(|| CoreError::invalid_amount(amount))
    }
}

impl TryFrom<i64> for Account {
    type Error = CoreError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Account::with_balance(Money::from_cents(cents))
    }
}

impl From<Account> for i64 {
    fn from(account: Account) -> Self {
        account.balance.cents()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
