//! # bank-db: Card Storage for Simple Bank
//!
//! This crate provides storage for cards and their balances behind the
//! [`CardStore`] trait, with an SQLite implementation (sqlx) and an
//! in-memory one.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Simple Bank Data Flow                            │
//! │                                                                         │
//! │  Terminal session (deposit, transfer, ...)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bank-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  CardStore    │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (store.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CardRepository│    │ 001_card.sql │  │   │
//! │  │   │               │    │ MemoryStore   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  card.s3db (SQLite file)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `CardStore` trait
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQLite repository implementations
//! - [`memory`] - In-memory store
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bank_db::{CardStore, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("card.s3db")).await?;
//! let cards = db.cards();
//! let highest = cards.highest_sequence().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::MemoryCardStore;
pub use pool::{Database, DbConfig};
pub use repository::card::CardRepository;
pub use store::CardStore;
