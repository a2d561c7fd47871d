//! The judgment collaborator consulted by the review evaluator.

use async_trait::async_trait;

use crate::error::MnemoResult;
use crate::types::{CardType, Stage};

/// Similarity scoring, equivalence judgment and coaching text generation.
///
/// Every method may suspend on a network or model call. Failures are
/// reported as [`MnemoError::OracleUnavailable`](crate::MnemoError::OracleUnavailable)
/// and are never turned into a verdict by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewOracle: Send + Sync {
    /// Semantic closeness of two answers, in `[0, 1]`.
    async fn similarity(&self, a: &str, b: &str) -> MnemoResult<f32>;

    /// Strict same-meaning judgment.
    async fn is_equivalent(&self, correct: &str, user: &str) -> MnemoResult<bool>;

    /// Coaching text for an answer. Must not reveal the literal answer when incorrect.
    async fn generate_feedback(
        &self,
        concept: &str,
        answer: &str,
        user_answer: &str,
        is_correct: bool,
    ) -> MnemoResult<String>;

    /// `k` concepts related to `concept`.
    async fn generate_related_concepts(&self, concept: &str, k: usize) -> MnemoResult<Vec<String>>;

    /// `n` follow-up questions about `concept`.
    async fn generate_advanced_questions(&self, concept: &str, n: usize) -> MnemoResult<Vec<String>>;

    /// Stage- and type-gated hint; empty where no hint applies.
    async fn generate_hint(
        &self,
        concept: &str,
        answer: &str,
        stage: Stage,
        card_type: CardType,
    ) -> MnemoResult<String>;

    /// Short definition used when a concept card is created without an answer.
    async fn generate_concept_definition(&self, concept: &str) -> MnemoResult<String>;
}

/// Whether a hint is produced for this stage and card type.
///
/// Word cards get hints at stages 3 and 4, concept cards at 2 through 4.
pub fn hint_applies(stage: Stage, card_type: CardType) -> bool {
    match card_type {
        CardType::Word => matches!(stage.get(), 3 | 4),
        CardType::Concept => matches!(stage.get(), 2..=4),
    }
}
