use std::sync::Arc;

use bank_core::{Card, CardFactory};
use bank_db::CardStore;
use tracing::info;

use crate::error::TerminalResult;

/// Issues new cards with the next free sequence number.
pub struct CardIssuer {
    store: Arc<dyn CardStore>,
    factory: CardFactory,
}

impl CardIssuer {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        CardIssuer {
            store,
            factory: CardFactory::new(),
        }
    }

    /// Numbers a card after the highest sequence in the store, gives it a
    /// random PIN and a zero balance, and stores it.
    pub async fn issue_new_card(&self) -> TerminalResult<Card> {
        let highest = self.store.highest_sequence().await?;
        let card = self.factory.next_card(highest, &mut rand::thread_rng())?;

        self.store.add(&card).await?;
        info!(number = %card.number(), "Card issued");

        Ok(card)
    }
}
