//! # Ledger
//!
//! Balance-changing operations for a logged-in card.
//!
//! ## Transfer Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_target("4000000000000028")                                    │
//! │     ├── checksum fails      → MalformedCardNumber                      │
//! │     ├── same as source      → SelfTransfer                             │
//! │     └── not in store        → CardNotFound                             │
//! │                                                                         │
//! │  transfer(source, target, amount)        [ledger lock held]            │
//! │     1. re-read both cards                                              │
//! │     2. withdraw from source  → InsufficientFunds aborts, nothing saved │
//! │     3. deposit into target                                             │
//! │     4. store.update_pair     (one SQL transaction)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read-modify-write holds the ledger lock and works on fresh copies
//! from the store, so a failed step never leaves a half-applied change.
//!
//! Clones share one lock. Sessions over the same store must use clones of a
//! single `Ledger`; two `Ledger::new` calls give two independent locks.

use std::sync::Arc;

use bank_core::{Card, CardNumber, CoreError, Money};
use bank_db::CardStore;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::TerminalResult;
use crate::services::card_lookup_error;

#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn CardStore>,
    lock: Arc<Mutex<()>>,
}

impl Ledger {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Ledger {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<dyn CardStore> {
        &self.store
    }

    async fn load(&self, number: &CardNumber) -> TerminalResult<Card> {
        self.store
            .get(number)
            .await
            .map_err(|err| card_lookup_error(number, err))
    }

    /// Current balance as stored.
    pub async fn balance(&self, number: &CardNumber) -> TerminalResult<Money> {
        let card = self.load(number).await?;
        Ok(card.account().balance())
    }

    /// Adds `amount` to the card's balance and persists it.
    pub async fn deposit(&self, number: &CardNumber, amount: Decimal) -> TerminalResult<Card> {
        let _guard = self.lock.lock().await;

        let mut card = self.load(number).await?;
        let credited = card.account_mut().deposit(amount)?;
        self.store.update(&card).await?;

        info!(%number, %credited, balance = %card.account().balance(), "Income added");
        Ok(card)
    }

    /// Checks a typed-in transfer target before asking for an amount.
    pub async fn resolve_target(
        &self,
        source: &CardNumber,
        input: &str,
    ) -> TerminalResult<CardNumber> {
        let target = CardNumber::parse(input)
            .ok()
            .filter(CardNumber::has_valid_checksum)
            .ok_or_else(|| CoreError::MalformedCardNumber(input.trim().to_string()))?;

        if &target == source {
            return Err(CoreError::SelfTransfer(target.to_string()).into());
        }

        if !self.store.contains(&target).await? {
            return Err(CoreError::CardNotFound(target.to_string()).into());
        }

        Ok(target)
    }

    /// Moves `amount` from `source` to `target`. Both cards are written
    /// together or not at all.
    ///
    /// Returns the updated `(source, target)` pair.
    pub async fn transfer(
        &self,
        source: &CardNumber,
        target: &CardNumber,
        amount: Decimal,
    ) -> TerminalResult<(Card, Card)> {
        if !target.has_valid_checksum() {
            return Err(CoreError::MalformedCardNumber(target.to_string()).into());
        }
        if source == target {
            return Err(CoreError::SelfTransfer(target.to_string()).into());
        }

        let _guard = self.lock.lock().await;

        let mut from = self.load(source).await?;
        let mut to = self.load(target).await?;
        debug!(%source, %target, %amount, "Transferring");

        if let Err(err) = from.account_mut().withdraw(amount) {
            warn!(%source, %amount, error = %err, "Transfer rejected");
            return Err(err.into());
        }
        to.account_mut().deposit(amount)?;

        self.store.update_pair(&from, &to).await?;

        info!(%source, %target, %amount, "Transfer completed");
        Ok((from, to))
    }

    /// Removes the card and its account.
    pub async fn close(&self, number: &CardNumber) -> TerminalResult<()> {
        let _guard = self.lock.lock().await;

        let card = self.load(number).await?;
        self.store
            .remove(&card)
            .await
            .map_err(|err| card_lookup_error(number, err))?;

        info!(%number, "Account closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bank_core::{Account, CardFactory, Pin};
    use bank_db::{Database, DbConfig, DbResult, MemoryCardStore};

    use crate::error::TerminalError;

    fn card(sequence: u32, cents: i64) -> Card {
        Card::with_account(
            CardFactory::new().number_for(sequence),
            Pin::new(1111).unwrap(),
            Account::with_balance(Money::from_cents(cents)).unwrap(),
        )
    }

    async fn ledger_with(cards: &[Card]) -> (Ledger, Arc<MemoryCardStore>) {
        let store = Arc::new(MemoryCardStore::new());
        for card in cards {
            store.add(card).await.unwrap();
        }
        (Ledger::new(store.clone()), store)
    }

    /// Yields after every read, so a read-modify-write left unguarded
    /// interleaves with a concurrent one.
    struct YieldingStore(MemoryCardStore);

    #[async_trait]
    impl CardStore for YieldingStore {
        async fn add(&self, card: &Card) -> DbResult<()> {
            self.0.add(card).await
        }

        async fn get(&self, number: &CardNumber) -> DbResult<Card> {
            let card = self.0.get(number).await;
            tokio::task::yield_now().await;
            card
        }

        async fn update(&self, card: &Card) -> DbResult<()> {
            self.0.update(card).await
        }

        async fn remove(&self, card: &Card) -> DbResult<()> {
            self.0.remove(card).await
        }

        async fn highest_sequence(&self) -> DbResult<u32> {
            self.0.highest_sequence().await
        }

        async fn update_pair(&self, first: &Card, second: &Card) -> DbResult<()> {
            self.0.update_pair(first, second).await
        }

        async fn count(&self) -> DbResult<u64> {
            self.0.count().await
        }
    }

    fn core(err: TerminalError) -> CoreError {
        match err {
            TerminalError::Core(err) => err,
            other => panic!("expected a core error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deposit_persists() {
        let a = card(1, 0);
        let (ledger, store) = ledger_with(&[a.clone()]).await;

        ledger.deposit(a.number(), Decimal::new(100, 0)).await.unwrap();

        let stored = store.get(a.number()).await.unwrap();
        assert_eq!(stored.account().balance(), Money::from_cents(10_000));
        assert_eq!(
            ledger.balance(a.number()).await.unwrap(),
            Money::from_cents(10_000)
        );
    }

    #[tokio::test]
    async fn test_negative_deposit_rejected() {
        let a = card(1, 500);
        let (ledger, store) = ledger_with(&[a.clone()]).await;

        let err = ledger.deposit(a.number(), Decimal::new(-1, 0)).await.unwrap_err();
        assert!(matches!(core(err), CoreError::InvalidAmount { .. }));
        assert_eq!(
            store.get(a.number()).await.unwrap().account().balance(),
            Money::from_cents(500)
        );
    }

    #[tokio::test]
    async fn test_transfer_moves_money() {
        let a = card(1, 10_000);
        let b = card(2, 0);
        let (ledger, store) = ledger_with(&[a.clone(), b.clone()]).await;

        let (from, to) = ledger
            .transfer(a.number(), b.number(), Decimal::new(40, 0))
            .await
            .unwrap();
        assert_eq!(from.account().balance(), Money::from_cents(6_000));
        assert_eq!(to.account().balance(), Money::from_cents(4_000));

        assert_eq!(
            store.get(b.number()).await.unwrap().account().balance(),
            Money::from_cents(4_000)
        );
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds_changes_nothing() {
        let a = card(1, 6_000);
        let b = card(2, 4_000);
        let (ledger, store) = ledger_with(&[a.clone(), b.clone()]).await;

        let err = ledger
            .transfer(a.number(), b.number(), Decimal::new(1000, 0))
            .await
            .unwrap_err();
        assert!(matches!(core(err), CoreError::InsufficientFunds { .. }));

        assert_eq!(store.get(a.number()).await.unwrap(), a);
        assert_eq!(store.get(b.number()).await.unwrap(), b);
    }

    #[tokio::test]
    async fn test_resolve_target() {
        let a = card(1, 0);
        let b = card(2, 0);
        let (ledger, _) = ledger_with(&[a.clone(), b.clone()]).await;

        assert_eq!(
            ledger.resolve_target(a.number(), b.number().as_str()).await.unwrap(),
            *b.number()
        );

        // Last digit off by one fails the checksum.
        let err = ledger
            .resolve_target(a.number(), "4000000000000029")
            .await
            .unwrap_err();
        assert!(matches!(core(err), CoreError::MalformedCardNumber(_)));

        let err = ledger.resolve_target(a.number(), "not a card").await.unwrap_err();
        assert!(matches!(core(err), CoreError::MalformedCardNumber(_)));

        let err = ledger
            .resolve_target(a.number(), a.number().as_str())
            .await
            .unwrap_err();
        assert!(matches!(core(err), CoreError::SelfTransfer(_)));

        let missing = CardFactory::new().number_for(3);
        let err = ledger
            .resolve_target(a.number(), missing.as_str())
            .await
            .unwrap_err();
        assert!(matches!(core(err), CoreError::CardNotFound(_)));
    }

    #[tokio::test]
    async fn test_self_transfer_rejected() {
        let a = card(1, 1_000);
        let (ledger, _) = ledger_with(&[a.clone()]).await;

        let err = ledger
            .transfer(a.number(), a.number(), Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(core(err), CoreError::SelfTransfer(_)));
    }

    #[tokio::test]
    async fn test_close_removes_card() {
        let a = card(1, 0);
        let (ledger, store) = ledger_with(&[a.clone()]).await;

        ledger.close(a.number()).await.unwrap();
        assert!(!store.contains(a.number()).await.unwrap());

        let err = ledger.close(a.number()).await.unwrap_err();
        assert!(matches!(core(err), CoreError::CardNotFound(_)));
    }

    #[tokio::test]
    async fn test_transfer_on_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store: Arc<dyn CardStore> = Arc::new(db.cards());
        let a = card(1, 10_000);
        let b = card(2, 0);
        store.add(&a).await.unwrap();
        store.add(&b).await.unwrap();

        let ledger = Ledger::new(store.clone());
        ledger
            .transfer(a.number(), b.number(), Decimal::new(2550, 2))
            .await
            .unwrap();

        assert_eq!(
            ledger.balance(a.number()).await.unwrap(),
            Money::from_cents(7_450)
        );
        assert_eq!(
            ledger.balance(b.number()).await.unwrap(),
            Money::from_cents(2_550)
        );
    }

    #[tokio::test]
    async fn test_cloned_ledgers_serialize_deposits() {
        let a = card(1, 0);
        let b = card(2, 10_000);
        let store: Arc<dyn CardStore> = Arc::new(YieldingStore(MemoryCardStore::new()));
        store.add(&a).await.unwrap();
        store.add(&b).await.unwrap();

        let first = Ledger::new(store.clone());
        let second = first.clone();
        let ten = Decimal::new(10, 0);

        let (left, right, moved) = tokio::join!(
            first.deposit(a.number(), ten),
            second.deposit(a.number(), ten),
            second.transfer(b.number(), a.number(), ten),
        );
        left.unwrap();
        right.unwrap();
        moved.unwrap();

        assert_eq!(
            store.get(a.number()).await.unwrap().account().balance(),
            Money::from_cents(3_000)
        );
        assert_eq!(
            store.get(b.number()).await.unwrap().account().balance(),
            Money::from_cents(9_000)
        );
    }
}
