//! # In-Memory Card Store
//!
//! A [`CardStore`] backed by a `Vec`, kept in issuance order. Used by tests
//! and by terminals configured with `in_memory = true`.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use bank_core::{Card, CardNumber};

use crate::error::{DbError, DbResult};
use crate::store::CardStore;

#[derive(Debug, Default)]
struct Inner {
    cards: Vec<Card>,
    highest_sequence: u32,
}

impl Inner {
    fn position(&self, number: &CardNumber) -> DbResult<usize> {
        self.cards
            .iter()
            .position(|card| card.number() == number)
            .ok_or_else(|| DbError::not_found("Card", number.as_str()))
    }
}

/// Card store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCardStore {
    inner: Mutex<Inner>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards in the order they were added.
    pub async fn snapshot(&self) -> Vec<Card> {
        self.inner.lock().await.cards.clone()
    }
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn add(&self, card: &Card) -> DbResult<()> {
        debug!(number = %card.number(), "Inserting card (memory)");

        let mut inner = self.inner.lock().await;
        if inner.cards.iter().any(|c| c.number() == card.number()) {
            return Err(DbError::duplicate("card number", card.number().as_str()));
        }
        inner.highest_sequence = inner.highest_sequence.max(card.number().sequence());
        inner.cards.push(card.clone());
        Ok(())
    }

    async fn get(&self, number: &CardNumber) -> DbResult<Card> {
        let inner = self.inner.lock().await;
        let index = inner.position(number)?;
        Ok(inner.cards[index].clone())
    }

    async fn update(&self, card: &Card) -> DbResult<()> {
        debug!(number = %card.number(), "Updating card (memory)");

        let mut inner = self.inner.lock().await;
        let index = inner.position(card.number())?;
        inner.cards[index] = card.clone();
        Ok(())
    }

    async fn remove(&self, card: &Card) -> DbResult<()> {
        debug!(number = %card.number(), "Removing card (memory)");

        let mut inner = self.inner.lock().await;
        let index = inner.position(card.number())?;
        inner.cards.remove(index);
        Ok(())
    }

    async fn highest_sequence(&self) -> DbResult<u32> {
        Ok(self.inner.lock().await.highest_sequence)
    }

    async fn update_pair(&self, first: &Card, second: &Card) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        // Resolve both before writing either.
        let first_index = inner.position(first.number())?;
        let second_index = inner.position(second.number())?;
        inner.cards[first_index] = first.clone();
        inner.cards[second_index] = second.clone();
        Ok(())
    }

    async fn count(&self) -> DbResult<u64> {
        Ok(self.inner.lock().await.cards.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_core::{CardFactory, Money, Pin};
    use rust_decimal::Decimal;

    fn card(sequence: u32) -> Card {
        Card::new(CardFactory::new().number_for(sequence), Pin::new(1234).unwrap())
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryCardStore::new();
        assert_eq!(store.highest_sequence().await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_get_contains() {
        let store = MemoryCardStore::new();
        let first = card(1);
        let second = card(2);
        store.add(&first).await.unwrap();
        assert!(store.contains(first.number()).await.unwrap());
        assert!(!store.contains(second.number()).await.unwrap());

        store.add(&second).await.unwrap();
        assert!(store.contains(second.number()).await.unwrap());
        assert!(store.contains(first.number()).await.unwrap());
        assert_eq!(store.get(second.number()).await.unwrap(), second);
        assert_eq!(store.snapshot().await, vec![first, second]);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let store = MemoryCardStore::new();
        store.add(&card(1)).await.unwrap();
        let err = store.add(&card(1)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = MemoryCardStore::new();
        let mut stored = card(1);
        store.add(&stored).await.unwrap();

        stored.account_mut().deposit(Decimal::new(25, 0)).unwrap();
        store.update(&stored).await.unwrap();
        let loaded = store.get(stored.number()).await.unwrap();
        assert_eq!(loaded.account().balance(), Money::from_cents(2500));

        store.remove(&stored).await.unwrap();
        assert!(store.get(stored.number()).await.unwrap_err().is_not_found());
        assert!(store.remove(&stored).await.unwrap_err().is_not_found());
        assert_eq!(store.highest_sequence().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_pair_missing_second_changes_nothing() {
        let store = MemoryCardStore::new();
        let mut stored = card(1);
        store.add(&stored).await.unwrap();
        stored.account_mut().deposit(Decimal::new(5, 0)).unwrap();

        assert!(store.update_pair(&stored, &card(9)).await.is_err());
        let loaded = store.get(stored.number()).await.unwrap();
        assert!(loaded.account().balance().is_zero());
    }
}
