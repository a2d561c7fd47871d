//! Summary statistics over a card set.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::types::{Card, Stats};

/// Aggregate counts, per-stage distribution and success rate.
///
/// `average_success_rate` weights every card equally, regardless of how
/// many reviews it has.
pub fn compute_stats(cards: &[Card], now: DateTime<Utc>) -> Stats {
    let mut by_stage: BTreeMap<u8, usize> = BTreeMap::new();
    let mut rate_sum = 0.0;
    let mut due_count = 0;

    for card in cards {
        *by_stage.entry(card.stage.get()).or_default() += 1;
        rate_sum += card.success_rate();
        if card.is_due_at(now) {
            due_count += 1;
        }
    }

    let average_success_rate = if cards.is_empty() {
        0.0
    } else {
        rate_sum / cards.len() as f64
    };

    Stats {
        total: cards.len(),
        by_stage,
        average_success_rate,
        due_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardType, ReviewRecord, Stage};
    use chrono::Duration;

    #[test]
    fn test_empty() {
        let stats = compute_stats(&[], Utc::now());
        assert_eq!(stats.total, 0);
        assert!(stats.by_stage.is_empty());
        assert_eq!(stats.average_success_rate, 0.0);
        assert_eq!(stats.due_count, 0);
    }

    #[test]
    fn test_unweighted_mean_of_card_rates() {
        let now = Utc::now();

        // 1 of 1 correct: 100%
        let mut a = Card::new("a", "a", CardType::Word);
        a.record_review(ReviewRecord::new(Stage::FIRST, "a", true, ""));
        a.update_next_review(now - Duration::minutes(1));

        // 1 of 4 correct: 25%
        let mut b = Card::new("b", "b", CardType::Concept);
        b.stage = Stage::new(3).unwrap();
        b.record_review(ReviewRecord::new(Stage::FIRST, "b", true, ""));
        for _ in 0..3 {
            b.record_review(ReviewRecord::new(Stage::FIRST, "x", false, ""));
        }
        b.update_next_review(now + Duration::days(7));

        // no history: 0%
        let mut c = Card::new("c", "c", CardType::Word);
        c.update_next_review(now);

        let stats = compute_stats(&[a, b, c], now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_stage.get(&1), Some(&2));
        assert_eq!(stats.by_stage.get(&3), Some(&1));
        assert_eq!(stats.by_stage.get(&2), None);
        // (100 + 25 + 0) / 3, not 2 of 5 = 40%
        assert!((stats.average_success_rate - 125.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.due_count, 2);
    }
}
