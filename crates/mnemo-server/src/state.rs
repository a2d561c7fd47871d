//! Server state management.

use std::collections::HashMap;
use std::sync::Arc;

use mnemo_core::config::MnemoConfig;
use mnemo_core::notify::WebhookSettingsStore;
use mnemo_core::schedule::ScheduleService;
use mnemo_core::traits::{CardStore, ReviewOracle};
use mnemo_core::{CardService, ReviewService};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared application state.
///
/// Cheap to clone; every handler gets its own copy of the `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub cards: Arc<CardService>,
    pub review: Arc<ReviewService>,
    pub oracle: Arc<dyn ReviewOracle>,
    pub webhook: WebhookSettingsStore,
    pub config: Arc<MnemoConfig>,
    pub review_locks: ReviewLocks,
}

impl AppState {
    /// Wire the services over an already opened store and oracle.
    pub fn new(
        config: MnemoConfig,
        store: Arc<dyn CardStore>,
        oracle: Arc<dyn ReviewOracle>,
        webhook: WebhookSettingsStore,
    ) -> Self {
        let schedule = ScheduleService::new(&config.schedule);
        let cards = Arc::new(CardService::new(store, schedule.clone()));
        let review = Arc::new(ReviewService::new(
            cards.clone(),
            oracle.clone(),
            schedule,
            &config.review,
        ));

        Self {
            cards,
            review,
            oracle,
            webhook,
            config: Arc::new(config),
            review_locks: ReviewLocks::default(),
        }
    }

    pub fn store(&self) -> Arc<dyn CardStore> {
        self.cards.store().clone()
    }
}

/// One mutex per card id so reviews of the same card run one at a time.
///
/// Entries nobody holds or waits on are dropped on the next acquire.
#[derive(Clone, Default)]
pub struct ReviewLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ReviewLocks {
    /// Wait for exclusive access to `card_id`.
    pub async fn lock(&self, card_id: &str) -> OwnedMutexGuard<()> {
        let card_lock = {
            let mut locks = self.inner.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(card_id.to_string()).or_default().clone()
        };
        card_lock.lock_owned().await
    }

    /// Number of cards with a live lock entry.
    pub async fn tracked_cards(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_card_waits_for_holder() {
        let locks = ReviewLocks::default();
        let guard = locks.lock("a").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(blocked.is_err());

        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock("b")).await;
        assert!(other.is_ok());

        drop(guard);
        let again = tokio::time::timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = ReviewLocks::default();
        drop(locks.lock("a").await);
        drop(locks.lock("b").await);

        let _held = locks.lock("c").await;
        assert_eq!(locks.tracked_cards().await, 1);
    }
}
