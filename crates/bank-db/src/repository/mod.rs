//! # Repository Module
//!
//! SQLite repository implementations for Simple Bank.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Terminal service (Ledger, CardIssuer, Authenticator)                  │
//! │       │                                                                 │
//! │       │  store.get(&number)                                            │
//! │       ▼                                                                 │
//! │  dyn CardStore ──► CardRepository                                      │
//! │                    ├── add / get / update / remove                     │
//! │                    ├── highest_sequence                                │
//! │                    └── update_pair (one transaction)                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CardRepository`](card::CardRepository) - Card records and balances

pub mod card;
