//! Results returned to callers of the review evaluator and stats aggregator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::Stage;

/// Structured result of one `process_review` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub is_correct: bool,
    pub feedback: String,
    /// `None` when a retry was offered and the schedule was left untouched.
    pub next_review: Option<DateTime<Utc>>,
    pub advanced: bool,
    /// Stage after the transition.
    pub stage: Stage,
    pub retry_allowed: bool,
    pub completed: bool,
    pub related_concepts: Option<Vec<String>>,
    /// Only ever populated for concept cards.
    pub advanced_questions: Option<Vec<String>>,
}

impl ReviewOutcome {
    /// Baseline outcome before any transition is applied.
    pub(crate) fn graded(is_correct: bool, feedback: String, stage: Stage) -> Self {
        Self {
            is_correct,
            feedback,
            next_review: None,
            advanced: false,
            stage,
            retry_allowed: false,
            completed: false,
            related_concepts: None,
            advanced_questions: None,
        }
    }
}

/// Summary counts over the card set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    /// Stage number to card count. Stages with no cards are absent.
    pub by_stage: BTreeMap<u8, usize>,
    /// Unweighted mean of per-card success rates, in percent.
    pub average_success_rate: f64,
    pub due_count: usize,
}
