//! # Bank Terminal Library
//!
//! Everything behind the `bank-terminal` binary: configuration, logging,
//! store selection and the interactive session.
//!
//! ## Module Organization
//! ```text
//! bank_terminal/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── TerminalConfig (TOML + env)
//! ├── console.rs      ◄─── Console trait, stdin/stdout and scripted
//! ├── session.rs      ◄─── Menu state machine
//! ├── services/
//! │   ├── issuer.rs   ◄─── CardIssuer
//! │   ├── auth.rs     ◄─── Authenticator
//! │   └── ledger.rs   ◄─── Ledger
//! └── error.rs        ◄─── TerminalError
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod services;
pub mod session;

use std::sync::Arc;

use bank_db::{CardStore, Database, DbConfig, MemoryCardStore};
use tracing::{info, info_span, Instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use config::TerminalConfig;
use console::{Console, StdConsole};
use error::TerminalResult;
use services::Ledger;
use session::Session;

/// Runs the terminal against stdin/stdout.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load configuration (file → env → validate)                         │
/// │  2. Initialize logging (stderr; RUST_LOG or [logging].filter)          │
/// │  3. Open the card store                                                │
/// │     • in_memory = true → MemoryCardStore                               │
/// │     • otherwise       → SQLite (WAL), migrations applied               │
/// │  4. Run one session until exit or end of input                         │
/// │  5. Close the pool                                                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> TerminalResult<()> {
    let config = TerminalConfig::load(None)?;
    init_tracing(&config.logging.filter);

    info!("Starting Simple Bank terminal");

    let (store, database) = open_store(&config).await?;
    let result = run_session(StdConsole::stdio(), Ledger::new(store), &config).await;

    if let Some(db) = database {
        db.close().await;
    }
    result
}

/// Runs one session in its own `session` span.
///
/// Concurrent sessions over one store should each get a clone of the same
/// `ledger`, so their balance updates share a lock.
pub async fn run_session<C: Console>(
    console: C,
    ledger: Ledger,
    config: &TerminalConfig,
) -> TerminalResult<()> {
    let session_id = Uuid::new_v4();
    let mut session = Session::with_ledger(console, ledger)
        .with_currency_symbol(config.display.currency_symbol.clone());

    async move {
        info!("Session started");
        let result = session.run().await;
        info!(ok = result.is_ok(), "Session ended");
        result
    }
    .instrument(info_span!("session", %session_id))
    .await
}

/// Opens the configured card store. The `Database` is returned so the
/// caller can close the pool.
pub async fn open_store(
    config: &TerminalConfig,
) -> TerminalResult<(Arc<dyn CardStore>, Option<Database>)> {
    if config.database.in_memory {
        info!("Using in-memory card store");
        return Ok((Arc::new(MemoryCardStore::new()), None));
    }

    let path = config.database.resolved_path()?;
    info!(?path, "Database path determined");

    let db = Database::new(DbConfig::new(path).max_connections(config.database.max_connections))
        .await?;
    Ok((Arc::new(db.cards()), Some(db)))
}

/// Installs the fmt subscriber on stderr; stdout carries the prompts.
///
/// `RUST_LOG` wins over the configured filter.
fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
