//! Card entity and review history.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::error::{ErrorCode, MnemoError, MnemoResult};

/// Kind of card. Selects the correctness policy and hint gating.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardType {
    /// Single word or term; graded on embedding similarity alone.
    #[default]
    Word,
    /// Definition-style answer; similarity pre-filter then equivalence check.
    Concept,
}

impl CardType {
    /// Parse a card type, failing with a validation error.
    pub fn parse(value: &str) -> MnemoResult<Self> {
        Self::from_str(value).map_err(|_| {
            MnemoError::invalid_field(
                "card_type",
                format!("Card type must be 'word' or 'concept', got '{}'", value),
                ErrorCode::ValInvalidCardType,
            )
        })
    }
}

/// Mastery stage, always within `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stage(u8);

impl Stage {
    /// Entry stage for new and reset cards.
    pub const FIRST: Stage = Stage(1);
    /// Ceiling stage.
    pub const MAX: Stage = Stage(4);

    /// Build a stage, rejecting values outside `1..=4`.
    pub fn new(value: u8) -> MnemoResult<Self> {
        if (Self::FIRST.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MnemoError::validation_with_code(
                format!("Stage must be between 1 and 4, got {}", value),
                ErrorCode::ValInvalidStage,
            ))
        }
    }

    /// Numeric value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether this is the ceiling stage.
    pub fn is_max(self) -> bool {
        self == Self::MAX
    }

    /// The following stage, or `None` at the ceiling.
    pub fn next(self) -> Option<Stage> {
        if self.is_max() {
            None
        } else {
            Some(Stage(self.0 + 1))
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u8> for Stage {
    type Error = MnemoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Stage::new(value)
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.0
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One graded answer. Immutable once appended to a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Stage the card was at when the answer was graded.
    pub stage: Stage,
    pub user_answer: String,
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}

impl ReviewRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        stage: Stage,
        user_answer: impl Into<String>,
        is_correct: bool,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            user_answer: user_answer.into(),
            is_correct,
            feedback: feedback.into(),
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for ReviewRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = if self.is_correct { "correct" } else { "incorrect" };
        write!(
            f,
            "[{}] stage {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.stage,
            result
        )
    }
}

/// A single memorization unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub concept: String,
    pub answer: String,
    pub card_type: CardType,
    pub stage: Stage,
    pub next_review: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<ReviewRecord>,
}

impl Card {
    /// Create an unvalidated card at stage 1, due immediately.
    ///
    /// Callers outside the crate should go through
    /// [`CardService::create_card`](crate::CardService::create_card), which validates.
    pub fn new(concept: impl Into<String>, answer: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            concept: concept.into(),
            answer: answer.into(),
            card_type,
            stage: Stage::FIRST,
            next_review: Utc::now(),
            history: Vec::new(),
        }
    }

    /// Advance one stage. Returns `false` (no change) at the ceiling.
    pub fn promote_stage(&mut self) -> bool {
        match self.stage.next() {
            Some(next) => {
                self.stage = next;
                true
            }
            None => false,
        }
    }

    /// Drop back to stage 1.
    pub fn reset_stage(&mut self) {
        self.stage = Stage::FIRST;
    }

    pub fn update_next_review(&mut self, next: DateTime<Utc>) {
        self.next_review = next;
    }

    /// Due when `now >= next_review`.
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review
    }

    pub fn is_due(&self) -> bool {
        self.is_due_at(Utc::now())
    }

    /// Append a graded answer.
    pub fn record_review(&mut self, record: ReviewRecord) {
        self.history.push(record);
    }

    /// Percentage of correct reviews, 0 without history.
    pub fn success_rate(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let correct = self.history.iter().filter(|r| r.is_correct).count();
        correct as f64 / self.history.len() as f64 * 100.0
    }

    /// Pre-answer hint: word cards at stage 2 show the first character and
    /// a `*` for each remaining one. Empty otherwise.
    pub fn masked_hint(&self) -> String {
        if self.card_type != CardType::Word || self.stage.get() != 2 {
            return String::new();
        }
        let mut chars = self.answer.chars();
        match chars.next() {
            Some(first) => std::iter::once(first).chain(chars.map(|_| '*')).collect(),
            None => String::new(),
        }
    }
}
