//! Card lifecycle: creation, edits, lookup and deletion.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{MnemoError, MnemoResult};
use crate::schedule::ScheduleService;
use crate::stats::compute_stats;
use crate::traits::CardStore;
use crate::types::{Card, CardType, Stats};
use crate::validation::CardValidator;

/// Validated access to the card store.
pub struct CardService {
    store: Arc<dyn CardStore>,
    schedule: ScheduleService,
    validator: CardValidator,
}

impl CardService {
    pub fn new(store: Arc<dyn CardStore>, schedule: ScheduleService) -> Self {
        Self {
            store,
            schedule,
            validator: CardValidator,
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn CardStore> {
        &self.store
    }

    /// Validate and persist a new card at stage 1, due immediately.
    pub fn create_card(&self, concept: &str, answer: &str, card_type: CardType) -> MnemoResult<Card> {
        self.validator.validate(concept, answer)?;

        let card = Card::new(concept, answer, card_type);
        self.store.save_card(&card)?;
        info!(card_id = %card.id, card_type = %card_type, "Created card");
        Ok(card)
    }

    pub fn get_card(&self, id: &str) -> MnemoResult<Option<Card>> {
        self.store.get_card(id)
    }

    /// Like [`get_card`](Self::get_card) but fails with `NotFound`.
    pub fn require_card(&self, id: &str) -> MnemoResult<Card> {
        self.store
            .get_card(id)?
            .ok_or_else(|| MnemoError::not_found(id))
    }

    pub fn get_all_cards(&self) -> MnemoResult<Vec<Card>> {
        self.store.get_all_cards()
    }

    /// Cards whose review time has passed.
    pub fn get_due_cards(&self) -> MnemoResult<Vec<Card>> {
        self.store.get_due_cards(Utc::now())
    }

    /// Replace concept, answer and type of an existing card.
    ///
    /// Id, stage and history are kept; the next review is recomputed at the
    /// current stage.
    pub fn update_card(
        &self,
        id: &str,
        concept: &str,
        answer: &str,
        card_type: CardType,
    ) -> MnemoResult<Card> {
        self.validator.validate(concept, answer)?;
        let mut card = self.require_card(id)?;

        card.concept = concept.to_string();
        card.answer = answer.to_string();
        card.card_type = card_type;
        card.update_next_review(self.schedule.next_review_time(card.stage, card.card_type));

        self.store.update_card(&card)?;
        info!(card_id = %card.id, stage = %card.stage, "Updated card");
        Ok(card)
    }

    /// Write back a card mutated by the review evaluator.
    pub(crate) fn persist(&self, card: &Card) -> MnemoResult<()> {
        debug!(card_id = %card.id, stage = %card.stage, "Persisting card");
        self.store.update_card(card)
    }

    /// Returns `false` when no card had this id.
    pub fn delete_card(&self, id: &str) -> MnemoResult<bool> {
        let deleted = self.store.delete_card(id)?;
        if deleted {
            info!(card_id = %id, "Deleted card");
        }
        Ok(deleted)
    }

    pub fn get_stats(&self) -> MnemoResult<Stats> {
        let cards = self.store.get_all_cards()?;
        Ok(compute_stats(&cards, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::storage::MemoryCardStore;
    use crate::types::{ReviewRecord, Stage};
    use chrono::Duration;

    fn service() -> CardService {
        CardService::new(Arc::new(MemoryCardStore::new()), ScheduleService::default())
    }

    #[test]
    fn test_create_card() {
        let svc = service();
        let before = Utc::now();
        let card = svc.create_card("apple", "사과", CardType::Word).unwrap();

        assert_eq!(card.stage, Stage::FIRST);
        assert!(card.next_review >= before && card.next_review <= Utc::now());
        assert_eq!(svc.get_card(&card.id).unwrap(), Some(card));
    }

    #[test]
    fn test_create_validates_before_persisting() {
        let svc = service();
        let err = svc
            .create_card(&"c".repeat(101), "answer", CardType::Word)
            .unwrap_err();
        assert!(matches!(err, MnemoError::Validation { .. }));

        assert!(svc.create_card("c", &"a".repeat(200), CardType::Word).is_ok());
        assert!(svc.create_card("c", &"a".repeat(201), CardType::Word).is_err());
        assert_eq!(svc.get_all_cards().unwrap().len(), 1);
    }

    #[test]
    fn test_update_keeps_stage_and_history() {
        let svc = service();
        let mut card = svc.create_card("apple", "사과", CardType::Word).unwrap();
        card.promote_stage();
        card.promote_stage();
        card.record_review(ReviewRecord::new(Stage::new(2).unwrap(), "사과", true, ""));
        svc.persist(&card).unwrap();

        let now = Utc::now();
        let updated = svc
            .update_card(&card.id, "banana", "바나나", CardType::Word)
            .unwrap();

        assert_eq!(updated.id, card.id);
        assert_eq!(updated.concept, "banana");
        assert_eq!(updated.stage.get(), 3);
        assert_eq!(updated.history.len(), 1);
        let delta = updated.next_review - now;
        assert!(delta >= Duration::days(7) && delta < Duration::days(7) + Duration::seconds(5));
    }

    #[test]
    fn test_update_unknown_card() {
        let err = service()
            .update_card("missing", "a", "b", CardType::Word)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CardNotFound);
    }

    #[test]
    fn test_delete_reports_result() {
        let svc = service();
        let card = svc.create_card("a", "b", CardType::Word).unwrap();
        assert!(svc.delete_card(&card.id).unwrap());
        assert!(!svc.delete_card(&card.id).unwrap());
    }

    #[test]
    fn test_get_all_is_stable() {
        let svc = service();
        svc.create_card("a", "1", CardType::Word).unwrap();
        svc.create_card("b", "2", CardType::Concept).unwrap();
        assert_eq!(svc.get_all_cards().unwrap(), svc.get_all_cards().unwrap());
    }

    #[test]
    fn test_stats_on_empty_store() {
        let stats = service().get_stats().unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_success_rate, 0.0);
        assert_eq!(stats.due_count, 0);
    }
}
