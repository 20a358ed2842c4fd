use std::sync::Arc;

use bank_core::{validation, Card, CardNumber, Pin};
use bank_db::CardStore;
use tracing::{info, warn};

use crate::error::TerminalResult;
use crate::services::card_lookup_error;

/// Checks card number + PIN pairs against the store.
pub struct Authenticator {
    store: Arc<dyn CardStore>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Authenticator { store }
    }

    /// Returns the stored card when `pin` matches.
    ///
    /// `CardNotFound` for an unknown number, `WrongPin` for a mismatch.
    pub async fn authenticate(&self, number: &CardNumber, pin: Pin) -> TerminalResult<Card> {
        let card = self
            .store
            .get(number)
            .await
            .map_err(|err| card_lookup_error(number, err))?;

        if let Err(err) = card.verify_pin(pin) {
            warn!(%number, "PIN mismatch");
            return Err(err.into());
        }

        info!(%number, "Card authenticated");
        Ok(card)
    }

    /// Structural check only: 16 digits with our issuer prefix.
    pub fn is_well_formed(&self, number: &str) -> bool {
        validation::is_well_formed(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_core::{CardFactory, CoreError};
    use bank_db::MemoryCardStore;

    use crate::error::TerminalError;

    async fn setup() -> (Authenticator, Card) {
        let store = Arc::new(MemoryCardStore::new());
        let card = Card::new(CardFactory::new().number_for(1), Pin::new(1234).unwrap());
        store.add(&card).await.unwrap();
        (Authenticator::new(store), card)
    }

    #[tokio::test]
    async fn test_right_pin() {
        let (auth, card) = setup().await;
        let found = auth
            .authenticate(card.number(), Pin::new(1234).unwrap())
            .await
            .unwrap();
        assert_eq!(found, card);
    }

    #[tokio::test]
    async fn test_wrong_pin() {
        let (auth, card) = setup().await;
        let err = auth
            .authenticate(card.number(), Pin::new(4321).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, TerminalError::Core(CoreError::WrongPin(_))));
    }

    #[tokio::test]
    async fn test_unknown_card() {
        let (auth, _) = setup().await;
        let unknown = CardFactory::new().number_for(2);
        let err = auth
            .authenticate(&unknown, Pin::new(1234).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, TerminalError::Core(CoreError::CardNotFound(_))));
    }

    #[tokio::test]
    async fn test_is_well_formed() {
        let (auth, _) = setup().await;
        assert!(auth.is_well_formed("4000001234567890"));
        assert!(!auth.is_well_formed("5000001234567890"));
        assert!(!auth.is_well_formed("400000123456789"));
    }
}
