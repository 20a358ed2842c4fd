//! # Card Repository
//!
//! SQLite implementation of [`CardStore`].
//!
//! ## Table Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ card                                                                    │
//! │ id │ number           │ sequence  │ pin  │ balance │ created/updated   │
//! │ 1  │ 4000000000000010 │ 1         │ 0042 │ 6000    │ ...               │
//! │ 2  │ 4000000000000028 │ 2         │ 9110 │ 4000    │ ...               │
//! │                                                                         │
//! │ card_sequence                                                           │
//! │ id │ highest   ← bumped on every add, never lowered by remove          │
//! │ 1  │ 2                                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use bank_core::{Account, Card, CardNumber, Money, Pin};

use crate::error::{DbError, DbResult};
use crate::store::CardStore;

/// Raw `card` row.
#[derive(Debug, sqlx::FromRow)]
struct CardRow {
    number: String,
    pin: String,
    balance: i64,
}

impl CardRow {
    /// Decodes the row, rejecting anything that breaks a card invariant.
    fn into_card(self) -> DbResult<Card> {
        let number = CardNumber::parse(&self.number)
            .map_err(|e| DbError::invalid_record(&self.number, e))?;
        let pin = Pin::parse(&self.pin).map_err(|e| DbError::invalid_record(&self.number, e))?;
        let account = Account::with_balance(Money::from_cents(self.balance))
            .map_err(|e| DbError::invalid_record(&self.number, e))?;
        Ok(Card::with_account(number, pin, account))
    }
}

/// Repository for card database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.cards();
///
/// repo.add(&card).await?;
/// let loaded = repo.get(card.number()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CardRepository {
    pool: SqlitePool,
}

impl CardRepository {
    /// Creates a new CardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CardRepository { pool }
    }

    async fn update_in(tx: &mut Transaction<'_, Sqlite>, card: &Card) -> DbResult<()> {
        let number = card.number().as_str();
        let result = sqlx::query(
            r#"
            UPDATE card
            SET
                pin = ?2,
                balance = ?3,
                updated_at = ?4
            WHERE number = ?1
            "#,
        )
        .bind(number)
        .bind(card.pin().to_string())
        .bind(card.account().balance().cents())
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Card", number));
        }

        Ok(())
    }
}

#[async_trait]
impl CardStore for CardRepository {
    async fn add(&self, card: &Card) -> DbResult<()> {
        let number = card.number().as_str();
        debug!(number = %number, "Inserting card");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO card (number, sequence, pin, balance, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(number)
        .bind(i64::from(card.number().sequence()))
        .bind(card.pin().to_string())
        .bind(card.account().balance().cents())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("card number", number),
            other => other,
        })?;

        sqlx::query("UPDATE card_sequence SET highest = MAX(highest, ?1) WHERE id = 1")
            .bind(i64::from(card.number().sequence()))
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, number: &CardNumber) -> DbResult<Card> {
        debug!(number = %number, "Fetching card");

        let row = sqlx::query_as::<_, CardRow>(
            "SELECT number, pin, balance FROM card WHERE number = ?1",
        )
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_card(),
            None => Err(DbError::not_found("Card", number.as_str())),
        }
    }

    async fn update(&self, card: &Card) -> DbResult<()> {
        debug!(number = %card.number(), "Updating card");

        let mut tx = self.pool.begin().await?;
        Self::update_in(&mut tx, card).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, card: &Card) -> DbResult<()> {
        let number = card.number().as_str();
        debug!(number = %number, "Removing card");

        let result = sqlx::query("DELETE FROM card WHERE number = ?1")
            .bind(number)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Card", number));
        }

        Ok(())
    }

    async fn highest_sequence(&self) -> DbResult<u32> {
        let highest: i64 = sqlx::query_scalar("SELECT highest FROM card_sequence WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?
            .unwrap_or(0);

        u32::try_from(highest).map_err(|e| DbError::invalid_record("card_sequence", e))
    }

    /// Both updates run inside one SQLite transaction; if the second fails
    /// the first is rolled back when `tx` is dropped.
    async fn update_pair(&self, first: &Card, second: &Card) -> DbResult<()> {
        debug!(first = %first.number(), second = %second.number(), "Updating card pair");

        let mut tx = self.pool.begin().await?;
        Self::update_in(&mut tx, first).await?;
        Self::update_in(&mut tx, second).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM card")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
