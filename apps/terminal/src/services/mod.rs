//! # Services
//!
//! Store-backed operations the session calls. Each service holds the shared
//! `Arc<dyn CardStore>`; the ledger rules themselves live in `bank-core`.
//!
//! ```text
//! services/
//! ├── issuer.rs   ◄─── CardIssuer: numbers new cards
//! ├── auth.rs     ◄─── Authenticator: number + PIN → Card
//! └── ledger.rs   ◄─── Ledger: balance, deposit, transfer, close
//! ```

pub mod auth;
pub mod issuer;
pub mod ledger;

pub use auth::Authenticator;
pub use issuer::CardIssuer;
pub use ledger::Ledger;

use bank_core::{CardNumber, CoreError};
use bank_db::DbError;

use crate::error::TerminalError;

/// Turns a store miss for `number` into the domain error.
pub(crate) fn card_lookup_error(number: &CardNumber, err: DbError) -> TerminalError {
    if err.is_not_found() {
        CoreError::CardNotFound(number.to_string()).into()
    } else {
        err.into()
    }
}
