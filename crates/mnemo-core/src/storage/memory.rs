//! In-process card store.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::MnemoResult;
use crate::traits::CardStore;
use crate::types::Card;

/// Volatile store for tests and throwaway sessions. Keeps insertion order.
#[derive(Debug, Default)]
pub struct MemoryCardStore {
    cards: RwLock<Vec<Card>>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CardStore for MemoryCardStore {
    fn save_card(&self, card: &Card) -> MnemoResult<()> {
        let mut cards = self.cards.write()?;
        match cards.iter_mut().find(|c| c.id == card.id) {
            Some(existing) => *existing = card.clone(),
            None => cards.push(card.clone()),
        }
        Ok(())
    }

    fn get_card(&self, id: &str) -> MnemoResult<Option<Card>> {
        let cards = self.cards.read()?;
        Ok(cards.iter().find(|c| c.id == id).cloned())
    }

    fn get_all_cards(&self) -> MnemoResult<Vec<Card>> {
        Ok(self.cards.read()?.clone())
    }

    fn update_card(&self, card: &Card) -> MnemoResult<()> {
        let mut cards = self.cards.write()?;
        if let Some(existing) = cards.iter_mut().find(|c| c.id == card.id) {
            *existing = card.clone();
        }
        Ok(())
    }

    fn delete_card(&self, id: &str) -> MnemoResult<bool> {
        let mut cards = self.cards.write()?;
        let before = cards.len();
        cards.retain(|c| c.id != id);
        Ok(cards.len() != before)
    }

    fn get_due_cards(&self, now: DateTime<Utc>) -> MnemoResult<Vec<Card>> {
        let cards = self.cards.read()?;
        Ok(cards.iter().filter(|c| c.is_due_at(now)).cloned().collect())
    }

    fn count(&self) -> MnemoResult<usize> {
        Ok(self.cards.read()?.len())
    }
}
