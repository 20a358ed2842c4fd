//! # Simple Bank Terminal Entry Point
//!
//! ```text
//! $ bank-terminal
//!
//! 1. Create an account
//! 2. Log into account
//! 0. Exit
//! ```
//!
//! Exits 0 on "Exit" or end of input, 1 when storage, configuration or the
//! console fail. The actual setup is in lib.rs for testability.

use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match bank_terminal::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Terminal stopped");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
