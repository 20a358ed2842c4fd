//! # CardStore Contract
//!
//! The narrow interface the rest of the system uses to persist cards.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       dyn CardStore                                     │
//! │                            │                                            │
//! │            ┌───────────────┴────────────────┐                          │
//! │            ▼                                ▼                           │
//! │   CardRepository (SQLite)          MemoryCardStore (Vec)               │
//! │   card.s3db on disk                tests and throwaway sessions        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers hold an `Arc<dyn CardStore>` handed to them at construction; there
//! is no global store.

use async_trait::async_trait;

use bank_core::{Card, CardNumber};

use crate::error::DbResult;

/// Persistence for card records keyed by card number.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Stores a new card. Fails with `UniqueViolation` if the number exists.
    async fn add(&self, card: &Card) -> DbResult<()>;

    /// Loads a card. Fails with `NotFound` if absent.
    async fn get(&self, number: &CardNumber) -> DbResult<Card>;

    /// Overwrites PIN and balance of an existing card. `NotFound` if absent.
    async fn update(&self, card: &Card) -> DbResult<()>;

    /// Deletes a card. `NotFound` if absent.
    async fn remove(&self, card: &Card) -> DbResult<()>;

    /// Highest sequence number ever added, 0 for a fresh store. Removing a
    /// card does not lower it.
    async fn highest_sequence(&self) -> DbResult<u32>;

    /// Updates two cards as one unit: either both writes land or neither.
    async fn update_pair(&self, first: &Card, second: &Card) -> DbResult<()>;

    /// Number of stored cards.
    async fn count(&self) -> DbResult<u64>;

    /// Whether a card with this number is stored.
    async fn contains(&self, number: &CardNumber) -> DbResult<bool> {
        match self.get(number).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
