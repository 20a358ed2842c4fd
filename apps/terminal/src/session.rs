//! # Session
//!
//! The menu state machine. One `Session` drives one user through the main
//! menu and the logged-in menu until they exit or input ends.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐  1 create (stay)                                        │
//! │   │ MainMenu │◄────────────┐                                           │
//! │   └──────────┘             │                                           │
//! │     │ 2 login     ▲        │ wrong number/PIN                          │
//! │     ▼             │        │                                           │
//! │   ┌───────────┐   │     ┌──┴───────┐                                   │
//! │   │ LoggingIn │───┼────►│ MainMenu │                                   │
//! │   └───────────┘   │     └──────────┘                                   │
//! │     │ ok          │ 5 log out                                          │
//! │     ▼             │                                                    │
//! │   ┌────────────────┐  1 balance · 2 income · 3 transfer (stay)         │
//! │   │ LoggedIn(card) │                                                   │
//! │   └────────────────┘                                                   │
//! │     │ 4 close · 0 exit · end of input                                  │
//! │     ▼                                                                   │
//! │   ┌────────┐                                                           │
//! │   │ Closed │  (MainMenu + 0 and end of input land here too)            │
//! │   └────────┘                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rule violations (`CoreError`) are shown to the user and the session
//! stays where it was. Storage and console failures end the session.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bank_core::{validation, Card, CardNumber, CoreError, Money, Pin};
use bank_db::CardStore;
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::error::{TerminalError, TerminalResult};
use crate::services::{Authenticator, CardIssuer, Ledger};

pub const MAIN_MENU: &str = "\n1. Create an account\n2. Log into account\n0. Exit";
pub const LOGGED_IN_MENU: &str =
    "\n1. Balance\n2. Add income\n3. Do transfer\n4. Close account\n5. Log out\n0. Exit";

const BYE: &str = "Bye!";
const UNKNOWN_OPTION: &str = "Unknown option, please choose from the menu.";
const WRONG_CREDENTIALS: &str = "\nWrong card number or PIN!";

// =============================================================================
// States & Menu Choices
// =============================================================================

/// Where the session is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    MainMenu,
    LoggingIn,
    LoggedIn(Card),
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenuChoice {
    CreateAccount,
    LogIn,
    Exit,
}

impl FromStr for MainMenuChoice {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MainMenuChoice::CreateAccount),
            "2" => Ok(MainMenuChoice::LogIn),
            "0" => Ok(MainMenuChoice::Exit),
            other => Err(UnknownChoice(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMenuChoice {
    Balance,
    AddIncome,
    Transfer,
    CloseAccount,
    LogOut,
    Exit,
}

impl FromStr for AccountMenuChoice {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(AccountMenuChoice::Balance),
            "2" => Ok(AccountMenuChoice::AddIncome),
            "3" => Ok(AccountMenuChoice::Transfer),
            "4" => Ok(AccountMenuChoice::CloseAccount),
            "5" => Ok(AccountMenuChoice::LogOut),
            "0" => Ok(AccountMenuChoice::Exit),
            other => Err(UnknownChoice(other.to_string())),
        }
    }
}

/// Menu input that matches no option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice(pub String);

impl fmt::Display for UnknownChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown menu option '{}'", self.0)
    }
}

impl std::error::Error for UnknownChoice {}

// =============================================================================
// Session
// =============================================================================

pub struct Session<C> {
    console: C,
    issuer: CardIssuer,
    authenticator: Authenticator,
    ledger: Ledger,
    currency_symbol: String,
    state: SessionState,
}

impl<C: Console> Session<C> {
    /// A session with a ledger of its own. Use [`Session::with_ledger`]
    /// when other sessions work on the same store.
    pub fn new(console: C, store: Arc<dyn CardStore>) -> Self {
        Session::with_ledger(console, Ledger::new(store))
    }

    /// A session sharing `ledger`, and its lock, with other sessions.
    pub fn with_ledger(console: C, ledger: Ledger) -> Self {
        let store = ledger.store().clone();
        Session {
            console,
            issuer: CardIssuer::new(store.clone()),
            authenticator: Authenticator::new(store),
            ledger,
            currency_symbol: String::new(),
            state: SessionState::MainMenu,
        }
    }

    /// Prefix for every amount shown, e.g. "$".
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Runs until the session is closed.
    pub async fn run(&mut self) -> TerminalResult<()> {
        while self.state != SessionState::Closed {
            self.step().await?;
        }
        Ok(())
    }

    /// Handles one menu interaction and moves to the next state.
    pub async fn step(&mut self) -> TerminalResult<()> {
        let current = std::mem::replace(&mut self.state, SessionState::Closed);
        let next = match current {
            SessionState::MainMenu => self.main_menu().await?,
            SessionState::LoggingIn => self.log_in().await?,
            SessionState::LoggedIn(card) => self.account_menu(card).await?,
            SessionState::Closed => SessionState::Closed,
        };
        debug!(state = ?StateName(&next), "Session state");
        self.state = next;
        Ok(())
    }

    // =========================================================================
    // Main menu
    // =========================================================================

    async fn main_menu(&mut self) -> TerminalResult<SessionState> {
        let Some(answer) = self.console.retrieve(MAIN_MENU)? else {
            return Ok(SessionState::Closed);
        };

        match answer.parse::<MainMenuChoice>() {
            Ok(MainMenuChoice::CreateAccount) => {
                let issued = self.issuer.issue_new_card().await;
                if let Some(card) = self.recover(issued)? {
                    self.console.display(&format!(
                        "\nYour card has been created\nYour card number:\n{}\nYour card PIN:\n{}",
                        card.number(),
                        card.pin()
                    ))?;
                }
                Ok(SessionState::MainMenu)
            }
            Ok(MainMenuChoice::LogIn) => Ok(SessionState::LoggingIn),
            Ok(MainMenuChoice::Exit) => {
                self.console.display(BYE)?;
                Ok(SessionState::Closed)
            }
            Err(err) => {
                debug!(%err, "Ignoring main menu input");
                self.console.display(UNKNOWN_OPTION)?;
                Ok(SessionState::MainMenu)
            }
        }
    }

    async fn log_in(&mut self) -> TerminalResult<SessionState> {
        let Some(number) = self.console.retrieve("\nEnter your card number:")? else {
            return Ok(SessionState::Closed);
        };
        let Some(pin) = self.console.retrieve("Enter your PIN:")? else {
            return Ok(SessionState::Closed);
        };

        let credentials = CardNumber::parse(&number).ok().zip(Pin::parse(&pin).ok());
        let Some((number, pin)) = credentials else {
            warn!("Unparseable login attempt");
            self.console.display(WRONG_CREDENTIALS)?;
            return Ok(SessionState::MainMenu);
        };

        match self.authenticator.authenticate(&number, pin).await {
            Ok(card) => {
                self.console.display("\nYou have successfully logged in!")?;
                Ok(SessionState::LoggedIn(card))
            }
            Err(TerminalError::Core(CoreError::CardNotFound(_) | CoreError::WrongPin(_))) => {
                self.console.display(WRONG_CREDENTIALS)?;
                Ok(SessionState::MainMenu)
            }
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // Logged-in menu
    // =========================================================================

    async fn account_menu(&mut self, card: Card) -> TerminalResult<SessionState> {
        let Some(answer) = self.console.retrieve(LOGGED_IN_MENU)? else {
            return Ok(SessionState::Closed);
        };

        let choice = match answer.parse::<AccountMenuChoice>() {
            Ok(choice) => choice,
            Err(err) => {
                debug!(%err, "Ignoring account menu input");
                self.console.display(UNKNOWN_OPTION)?;
                return Ok(SessionState::LoggedIn(card));
            }
        };

        match choice {
            AccountMenuChoice::Balance => {
                let balance = self.ledger.balance(card.number()).await;
                if let Some(balance) = self.recover(balance)? {
                    let text = format!("\nBalance: {}", self.amount(balance));
                    self.console.display(&text)?;
                }
                Ok(SessionState::LoggedIn(card))
            }
            AccountMenuChoice::AddIncome => self.add_income(card).await,
            AccountMenuChoice::Transfer => self.transfer(card).await,
            AccountMenuChoice::CloseAccount => {
                let closed = self.ledger.close(card.number()).await;
                if self.recover(closed)?.is_none() {
                    return Ok(SessionState::LoggedIn(card));
                }
                self.console.display("\nThe account has been closed!")?;
                Ok(SessionState::Closed)
            }
            AccountMenuChoice::LogOut => {
                info!(number = %card.number(), "Logged out");
                self.console.display("\nYou have successfully logged out!")?;
                Ok(SessionState::MainMenu)
            }
            AccountMenuChoice::Exit => {
                self.console.display(BYE)?;
                Ok(SessionState::Closed)
            }
        }
    }

    async fn add_income(&mut self, card: Card) -> TerminalResult<SessionState> {
        let Some(input) = self.console.retrieve("\nEnter income:")? else {
            return Ok(SessionState::Closed);
        };

        let deposited = match validation::parse_amount(&input) {
            Ok(amount) => self.ledger.deposit(card.number(), amount).await,
            Err(err) => Err(err.into()),
        };

        match self.recover(deposited)? {
            Some(updated) => {
                self.console.display("Income was added!")?;
                Ok(SessionState::LoggedIn(updated))
            }
            None => Ok(SessionState::LoggedIn(card)),
        }
    }

    async fn transfer(&mut self, card: Card) -> TerminalResult<SessionState> {
        self.console.display("\nTransfer")?;
        let Some(input) = self.console.retrieve("Enter card number:")? else {
            return Ok(SessionState::Closed);
        };

        let resolved = self.ledger.resolve_target(card.number(), &input).await;
        let Some(target) = self.recover(resolved)? else {
            return Ok(SessionState::LoggedIn(card));
        };

        let Some(input) = self
            .console
            .retrieve("Enter how much money you want to transfer:")?
        else {
            return Ok(SessionState::Closed);
        };

        let transferred = match validation::parse_amount(&input) {
            Ok(amount) => self.ledger.transfer(card.number(), &target, amount).await,
            Err(err) => Err(err.into()),
        };

        match self.recover(transferred)? {
            Some((updated, _)) => {
                self.console.display("Success!")?;
                Ok(SessionState::LoggedIn(updated))
            }
            None => Ok(SessionState::LoggedIn(card)),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Shows recoverable errors to the user and turns them into `None`.
    /// Anything else is passed up.
    fn recover<T>(&mut self, result: TerminalResult<T>) -> TerminalResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(TerminalError::Core(err)) => {
                warn!(error = %err, "Operation rejected");
                self.console.display(&user_message(&err))?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn amount(&self, money: Money) -> String {
        format!("{}{}", self.currency_symbol, money)
    }
}

/// What the user sees for a rejected operation.
pub fn user_message(err: &CoreError) -> String {
    match err {
        CoreError::InvalidAmount { .. } | CoreError::Validation(_) => {
            "Please enter a non-negative amount.".to_string()
        }
        CoreError::InsufficientFunds { .. } => "Not enough money!".to_string(),
        CoreError::CardNotFound(_) => "Such a card does not exist.".to_string(),
        CoreError::WrongPin(_) => WRONG_CREDENTIALS.trim_start().to_string(),
        CoreError::MalformedCardNumber(_) => {
            "Probably you made a mistake in the card number. Please try again!".to_string()
        }
        CoreError::SelfTransfer(_) => "You can't transfer money to the same account!".to_string(),
        CoreError::SequenceExhausted { .. } => "No more cards can be issued.".to_string(),
    }
}

/// State without the card, for logs.
struct StateName<'a>(&'a SessionState);

impl fmt::Debug for StateName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            SessionState::MainMenu => f.write_str("MainMenu"),
            SessionState::LoggingIn => f.write_str("LoggingIn"),
            SessionState::LoggedIn(card) => write!(f, "LoggedIn({})", card.number()),
            SessionState::Closed => f.write_str("Closed"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
