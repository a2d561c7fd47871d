//! Card storage trait.

use chrono::{DateTime, Utc};

use crate::error::MnemoResult;
use crate::types::Card;

/// Persistence for cards. Implementations preserve insertion order in
/// `get_all_cards` and `get_due_cards`.
pub trait CardStore: Send + Sync {
    /// Insert or replace a card.
    fn save_card(&self, card: &Card) -> MnemoResult<()>;

    /// Get card by ID.
    fn get_card(&self, id: &str) -> MnemoResult<Option<Card>>;

    /// All cards.
    fn get_all_cards(&self) -> MnemoResult<Vec<Card>>;

    /// Overwrite an existing card. Unknown ids are ignored.
    fn update_card(&self, card: &Card) -> MnemoResult<()>;

    /// Remove a card. Returns whether anything was deleted.
    fn delete_card(&self, id: &str) -> MnemoResult<bool>;

    /// Cards with `next_review <= now`.
    fn get_due_cards(&self, now: DateTime<Utc>) -> MnemoResult<Vec<Card>>;

    /// Number of stored cards.
    fn count(&self) -> MnemoResult<usize> {
        Ok(self.get_all_cards()?.len())
    }
}
