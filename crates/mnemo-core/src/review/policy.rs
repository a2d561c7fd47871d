//! Correctness thresholds and stage-transition selection.
//!
//! Both halves are pure. The async oracle calls live in
//! [`ReviewService`](super::ReviewService), which feeds similarity scores
//! and equivalence verdicts through these functions.

use serde::{Deserialize, Serialize};

use crate::config::{FeedbackMessages, ReviewConfig};
use crate::types::Stage;

/// Tagged correctness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    /// Incorrect but close: a typo for words, a near miss for concepts.
    IncorrectNear,
    IncorrectFar,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

/// Verdict plus the feedback shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub verdict: Verdict,
    pub feedback: String,
}

impl Grade {
    pub fn correct() -> Self {
        Self {
            verdict: Verdict::Correct,
            feedback: String::new(),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.verdict.is_correct()
    }
}

/// Outcome of the concept similarity pre-filter.
#[derive(Debug, Clone, PartialEq)]
pub enum ConceptScreen {
    /// Similar enough to ask the equivalence oracle.
    Escalate,
    /// Rejected without any further oracle call.
    Reject(Grade),
}

/// Threshold table and feedback templates.
#[derive(Debug, Clone)]
pub struct ReviewPolicy {
    word_correct: f32,
    word_near: f32,
    concept_pass: f32,
    messages: FeedbackMessages,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self::new(&ReviewConfig::default())
    }
}

impl ReviewPolicy {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            word_correct: config.word_correct_threshold,
            word_near: config.word_near_threshold,
            concept_pass: config.concept_pass_threshold,
            messages: config.messages.clone(),
        }
    }

    /// Word cards are graded on similarity alone.
    pub fn grade_word(&self, similarity: f32) -> Grade {
        if similarity >= self.word_correct {
            Grade::correct()
        } else if similarity >= self.word_near {
            Grade {
                verdict: Verdict::IncorrectNear,
                feedback: self.messages.word_typo.clone(),
            }
        } else {
            Grade {
                verdict: Verdict::IncorrectFar,
                feedback: FeedbackMessages::render(&self.messages.word_far, similarity),
            }
        }
    }

    /// Cheap pre-filter run before the equivalence oracle.
    pub fn screen_concept(&self, similarity: f32) -> ConceptScreen {
        if similarity < self.concept_pass {
            ConceptScreen::Reject(Grade {
                verdict: Verdict::IncorrectFar,
                feedback: FeedbackMessages::render(&self.messages.concept_far, similarity),
            })
        } else {
            ConceptScreen::Escalate
        }
    }

    /// Grade after the equivalence oracle ran. `feedback` is only used when not equivalent.
    pub fn grade_concept(&self, equivalent: bool, feedback: String) -> Grade {
        if equivalent {
            Grade::correct()
        } else {
            Grade {
                verdict: Verdict::IncorrectNear,
                feedback,
            }
        }
    }
}

/// What happens to the card once correctness is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Correct at the ceiling stage.
    Complete,
    /// Correct below the ceiling.
    Promote,
    /// Incorrect on a first attempt. Card schedule is untouched.
    OfferRetry,
    /// Incorrect on the retry attempt.
    Reset,
}

impl Transition {
    pub fn select(is_correct: bool, stage: Stage, retry: bool) -> Self {
        match (is_correct, stage.is_max(), retry) {
            (true, true, _) => Transition::Complete,
            (true, false, _) => Transition::Promote,
            (false, _, false) => Transition::OfferRetry,
            (false, _, true) => Transition::Reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_thresholds() {
        let policy = ReviewPolicy::default();

        assert_eq!(policy.grade_word(0.95), Grade::correct());
        assert_eq!(policy.grade_word(1.0), Grade::correct());

        let near = policy.grade_word(0.80);
        assert_eq!(near.verdict, Verdict::IncorrectNear);
        assert_eq!(near.feedback, FeedbackMessages::default().word_typo);

        let boundary = policy.grade_word(0.72);
        assert_eq!(boundary.verdict, Verdict::IncorrectNear);

        let far = policy.grade_word(0.50);
        assert_eq!(far.verdict, Verdict::IncorrectFar);
        assert!(far.feedback.contains("0.50"));
    }

    #[test]
    fn test_embedding_score_just_below_threshold_is_near() {
        // Would round to 0.9500 at four decimals.
        let cos = 0.94996f32;
        let score = crate::oracle::answer_similarity(&[1.0, 0.0], &[cos, (1.0 - cos * cos).sqrt()])
            .unwrap();
        assert!(score < 0.95);

        let grade = ReviewPolicy::default().grade_word(score);
        assert_eq!(grade.verdict, Verdict::IncorrectNear);
    }

    #[test]
    fn test_concept_screen() {
        let policy = ReviewPolicy::default();

        match policy.screen_concept(0.60) {
            ConceptScreen::Reject(grade) => {
                assert!(!grade.is_correct());
                assert!(grade.feedback.contains("0.60"));
            }
            ConceptScreen::Escalate => panic!("0.60 should be rejected"),
        }
        assert_eq!(policy.screen_concept(0.75), ConceptScreen::Escalate);
    }

    #[test]
    fn test_grade_concept() {
        let policy = ReviewPolicy::default();
        assert_eq!(policy.grade_concept(true, "ignored".into()), Grade::correct());

        let grade = policy.grade_concept(false, "think about X".into());
        assert!(!grade.is_correct());
        assert_eq!(grade.feedback, "think about X");
    }

    #[test]
    fn test_transition_table() {
        let s = |n| Stage::new(n).unwrap();
        assert_eq!(Transition::select(true, s(4), false), Transition::Complete);
        assert_eq!(Transition::select(true, s(4), true), Transition::Complete);
        assert_eq!(Transition::select(true, s(2), false), Transition::Promote);
        assert_eq!(Transition::select(false, s(3), false), Transition::OfferRetry);
        assert_eq!(Transition::select(false, s(3), true), Transition::Reset);
        assert_eq!(Transition::select(false, s(4), true), Transition::Reset);
    }
}
