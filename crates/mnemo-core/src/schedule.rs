//! Review interval calculation.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::ScheduleConfig;
use crate::types::{CardType, Stage};

/// Maps a stage to the time until its next review.
#[derive(Debug, Clone)]
pub struct ScheduleService {
    intervals: HashMap<u8, Duration>,
    fallback: Duration,
}

impl Default for ScheduleService {
    fn default() -> Self {
        Self::new(&ScheduleConfig::default())
    }
}

impl ScheduleService {
    pub fn new(config: &ScheduleConfig) -> Self {
        let intervals = config
            .stage_intervals
            .iter()
            .map(|i| (i.stage, secs(i.seconds)))
            .collect();
        Self {
            intervals,
            fallback: secs(config.fallback_secs),
        }
    }

    /// Interval for a raw stage number. Unmapped stages get the fallback (one day by default).
    pub fn interval_for(&self, stage: u8) -> Duration {
        self.intervals.get(&stage).copied().unwrap_or(self.fallback)
    }

    /// `now + interval(stage)`.
    ///
    /// `card_type` does not affect the interval yet; it is accepted so
    /// per-type schedules can be added without changing callers.
    pub fn next_review_time(&self, stage: Stage, card_type: CardType) -> DateTime<Utc> {
        self.next_review_time_from(Utc::now(), stage, card_type)
    }

    /// Same as [`next_review_time`](Self::next_review_time) with an explicit clock.
    pub fn next_review_time_from(
        &self,
        now: DateTime<Utc>,
        stage: Stage,
        _card_type: CardType,
    ) -> DateTime<Utc> {
        now.checked_add_signed(self.interval_for(stage.get()))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

fn secs(seconds: u64) -> Duration {
    let capped = seconds.min((i64::MAX / 1000) as u64);
    Duration::seconds(capped as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageInterval;

    #[test]
    fn test_default_intervals() {
        let schedule = ScheduleService::default();
        let now = Utc::now();
        let at = |n| schedule.next_review_time_from(now, Stage::new(n).unwrap(), CardType::Word);

        assert_eq!(at(1) - now, Duration::minutes(10));
        assert_eq!(at(2) - now, Duration::hours(24));
        assert_eq!(at(3) - now, Duration::days(7));
        assert_eq!(at(4) - now, Duration::days(30));
    }

    #[test]
    fn test_card_type_does_not_change_interval() {
        let schedule = ScheduleService::default();
        let now = Utc::now();
        let stage = Stage::new(3).unwrap();
        assert_eq!(
            schedule.next_review_time_from(now, stage, CardType::Word),
            schedule.next_review_time_from(now, stage, CardType::Concept)
        );
    }

    #[test]
    fn test_unmapped_stage_falls_back_to_one_day() {
        let schedule = ScheduleService::new(&ScheduleConfig {
            stage_intervals: vec![StageInterval { stage: 1, seconds: 60 }],
            fallback_secs: 86_400,
        });
        assert_eq!(schedule.interval_for(1), Duration::seconds(60));
        assert_eq!(schedule.interval_for(3), Duration::days(1));
        assert_eq!(schedule.interval_for(9), Duration::days(1));
    }
}
