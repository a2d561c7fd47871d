//! The review evaluator: grades an answer and moves the card through its stages.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use crate::cards::CardService;
use crate::config::ReviewConfig;
use crate::error::MnemoResult;
use crate::schedule::ScheduleService;
use crate::traits::ReviewOracle;
use crate::types::{Card, CardType, ReviewOutcome, ReviewRecord};

use super::policy::{ConceptScreen, Grade, ReviewPolicy, Transition};

/// Grades answers and applies stage transitions.
///
/// Callers must serialize reviews of the same card: `process_review` is a
/// read-modify-write with no concurrency control.
pub struct ReviewService {
    cards: Arc<CardService>,
    oracle: Arc<dyn ReviewOracle>,
    schedule: ScheduleService,
    policy: ReviewPolicy,
    related_count: usize,
    questions_count: usize,
    retry_reset_delay: Duration,
}

impl ReviewService {
    pub fn new(
        cards: Arc<CardService>,
        oracle: Arc<dyn ReviewOracle>,
        schedule: ScheduleService,
        config: &ReviewConfig,
    ) -> Self {
        Self {
            cards,
            oracle,
            schedule,
            policy: ReviewPolicy::new(config),
            related_count: config.related_concepts_count,
            questions_count: config.advanced_questions_count,
            retry_reset_delay: Duration::seconds(
                config.retry_reset_delay_secs.min(i64::MAX as u64 / 1000) as i64,
            ),
        }
    }

    /// Grade `user_answer` for the card and apply the resulting transition.
    ///
    /// `retry` is set when the caller is resubmitting after a
    /// `retry_allowed` outcome. Fails with `NotFound` for an unknown id and
    /// propagates oracle failures; in both cases the card is left untouched.
    #[instrument(skip(self, user_answer))]
    pub async fn process_review(
        &self,
        card_id: &str,
        user_answer: &str,
        retry: bool,
    ) -> MnemoResult<ReviewOutcome> {
        let mut card = self.cards.require_card(card_id)?;
        let grade = self.grade(&card, user_answer).await?;
        let is_correct = grade.is_correct();

        card.record_review(ReviewRecord::new(
            card.stage,
            user_answer,
            is_correct,
            grade.feedback.clone(),
        ));

        let transition = Transition::select(is_correct, card.stage, retry);
        debug!(card_id, stage = %card.stage, verdict = ?grade.verdict, ?transition, "Graded answer");

        let mut outcome = ReviewOutcome::graded(is_correct, grade.feedback, card.stage);

        match transition {
            Transition::Complete => {
                outcome.completed = true;
                if card.card_type == CardType::Concept {
                    outcome.advanced_questions = Some(
                        self.oracle
                            .generate_advanced_questions(&card.concept, self.questions_count)
                            .await?,
                    );
                }
                outcome.related_concepts = Some(
                    self.oracle
                        .generate_related_concepts(&card.concept, self.related_count)
                        .await?,
                );
                outcome.advanced = card.promote_stage();
                self.reschedule(&mut card, &mut outcome);
            }
            Transition::Promote => {
                outcome.advanced = card.promote_stage();
                self.reschedule(&mut card, &mut outcome);
            }
            Transition::OfferRetry => {
                outcome.retry_allowed = true;
            }
            Transition::Reset => {
                card.reset_stage();
                let next = Utc::now() + self.retry_reset_delay;
                card.update_next_review(next);
                outcome.next_review = Some(next);
                outcome.advanced = false;
            }
        }
        outcome.stage = card.stage;

        self.cards.persist(&card)?;
        info!(
            card_id,
            stage = %card.stage,
            correct = is_correct,
            completed = outcome.completed,
            "Review processed"
        );
        Ok(outcome)
    }

    async fn grade(&self, card: &Card, user_answer: &str) -> MnemoResult<Grade> {
        let similarity = self.oracle.similarity(&card.answer, user_answer).await?;
        debug!(card_id = %card.id, similarity, "Scored answer");

        match card.card_type {
            CardType::Word => Ok(self.policy.grade_word(similarity)),
            CardType::Concept => match self.policy.screen_concept(similarity) {
                ConceptScreen::Reject(grade) => Ok(grade),
                ConceptScreen::Escalate => {
                    let equivalent = self.oracle.is_equivalent(&card.answer, user_answer).await?;
                    let feedback = if equivalent {
                        String::new()
                    } else {
                        self.oracle
                            .generate_feedback(&card.concept, &card.answer, user_answer, false)
                            .await?
                    };
                    Ok(self.policy.grade_concept(equivalent, feedback))
                }
            },
        }
    }

    fn reschedule(&self, card: &mut Card, outcome: &mut ReviewOutcome) {
        let next = self.schedule.next_review_time(card.stage, card.card_type);
        card.update_next_review(next);
        outcome.next_review = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Collaborator, ErrorCode, MnemoError};
    use crate::storage::MemoryCardStore;
    use crate::traits::MockReviewOracle;
    use crate::types::Stage;

    struct Fixture {
        cards: Arc<CardService>,
        card: Card,
    }

    fn fixture(card_type: CardType, stage: u8) -> Fixture {
        let cards = Arc::new(CardService::new(
            Arc::new(MemoryCardStore::new()),
            ScheduleService::default(),
        ));
        let mut card = cards.create_card("apple", "사과", card_type).unwrap();
        card.stage = Stage::new(stage).unwrap();
        cards.persist(&card).unwrap();
        Fixture { cards, card }
    }

    fn service(fx: &Fixture, oracle: MockReviewOracle) -> ReviewService {
        ReviewService::new(
            fx.cards.clone(),
            Arc::new(oracle),
            ScheduleService::default(),
            &ReviewConfig::default(),
        )
    }

    fn oracle_with_similarity(score: f32) -> MockReviewOracle {
        let mut oracle = MockReviewOracle::new();
        oracle.expect_similarity().returning(move |_, _| Ok(score));
        oracle
    }

    #[tokio::test]
    async fn test_correct_below_ceiling_promotes() {
        let fx = fixture(CardType::Word, 2);
        let svc = service(&fx, oracle_with_similarity(0.99));

        let before = Utc::now();
        let outcome = svc.process_review(&fx.card.id, "사과", false).await.unwrap();

        assert!(outcome.is_correct);
        assert!(outcome.advanced);
        assert_eq!(outcome.stage.get(), 3);
        assert!(!outcome.completed);
        assert!(outcome.related_concepts.is_none());

        let next = outcome.next_review.unwrap();
        assert!(next - before >= Duration::days(7));
        assert!(next - before < Duration::days(7) + Duration::seconds(5));

        let stored = fx.cards.require_card(&fx.card.id).unwrap();
        assert_eq!(stored.stage.get(), 3);
        assert_eq!(stored.next_review, next);
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.history[0].stage.get(), 2);
    }

    #[tokio::test]
    async fn test_word_near_miss_offers_retry_without_touching_schedule() {
        let fx = fixture(CardType::Word, 3);
        let svc = service(&fx, oracle_with_similarity(0.80));

        let outcome = svc.process_review(&fx.card.id, "사가", false).await.unwrap();

        assert!(!outcome.is_correct);
        assert_eq!(outcome.feedback, "Please check for typos.");
        assert!(outcome.retry_allowed);
        assert!(outcome.next_review.is_none());
        assert_eq!(outcome.stage.get(), 3);

        let stored = fx.cards.require_card(&fx.card.id).unwrap();
        assert_eq!(stored.stage.get(), 3);
        assert_eq!(stored.next_review, fx.card.next_review);
        assert_eq!(stored.history.len(), 1);
        assert!(!stored.history[0].is_correct);
    }

    #[tokio::test]
    async fn test_failed_retry_resets_to_first_stage() {
        let fx = fixture(CardType::Word, 3);
        let svc = service(&fx, oracle_with_similarity(0.10));

        let before = Utc::now();
        let outcome = svc.process_review(&fx.card.id, "pear", true).await.unwrap();

        assert!(!outcome.is_correct);
        assert!(outcome.feedback.contains("0.10"));
        assert!(!outcome.retry_allowed);
        assert!(!outcome.advanced);
        assert_eq!(outcome.stage, Stage::FIRST);
        let delay = outcome.next_review.unwrap() - before;
        assert!(delay >= Duration::minutes(10) && delay < Duration::minutes(10) + Duration::seconds(5));

        let stored = fx.cards.require_card(&fx.card.id).unwrap();
        assert_eq!(stored.stage, Stage::FIRST);
        assert_eq!(stored.history[0].stage.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_reset_delay_is_independent_of_stage_one_interval() {
        let fx = fixture(CardType::Word, 2);
        let config = ReviewConfig {
            retry_reset_delay_secs: 120,
            ..Default::default()
        };
        let svc = ReviewService::new(
            fx.cards.clone(),
            Arc::new(oracle_with_similarity(0.0)),
            ScheduleService::default(),
            &config,
        );

        let before = Utc::now();
        let outcome = svc.process_review(&fx.card.id, "x", true).await.unwrap();
        let delay = outcome.next_review.unwrap() - before;
        assert!(delay >= Duration::minutes(2) && delay < Duration::minutes(3));
    }

    #[tokio::test]
    async fn test_word_completion_has_related_concepts_only() {
        let fx = fixture(CardType::Word, 4);
        let mut oracle = oracle_with_similarity(0.97);
        oracle
            .expect_generate_related_concepts()
            .withf(|concept, k| concept == "apple" && *k == 5)
            .times(1)
            .returning(|_, _| Ok(vec!["pear".into(), "fruit".into()]));
        oracle.expect_generate_advanced_questions().times(0);
        let svc = service(&fx, oracle);

        let outcome = svc.process_review(&fx.card.id, "사과", false).await.unwrap();

        assert!(outcome.is_correct);
        assert!(outcome.completed);
        assert!(!outcome.advanced);
        assert_eq!(outcome.stage, Stage::MAX);
        assert_eq!(outcome.related_concepts.unwrap().len(), 2);
        assert!(outcome.advanced_questions.is_none());
        let delta = outcome.next_review.unwrap() - Utc::now();
        assert!(delta > Duration::days(29));
    }

    #[tokio::test]
    async fn test_concept_completion_includes_advanced_questions() {
        let fx = fixture(CardType::Concept, 4);
        let mut oracle = oracle_with_similarity(0.9);
        oracle.expect_is_equivalent().times(1).returning(|_, _| Ok(true));
        oracle.expect_generate_feedback().times(0);
        oracle
            .expect_generate_advanced_questions()
            .withf(|_, n| *n == 3)
            .times(1)
            .returning(|_, _| Ok(vec!["q1".into(), "q2".into(), "q3".into()]));
        oracle
            .expect_generate_related_concepts()
            .times(1)
            .returning(|_, _| Ok(vec!["r".into()]));
        let svc = service(&fx, oracle);

        let outcome = svc.process_review(&fx.card.id, "answer", false).await.unwrap();

        assert!(outcome.completed);
        assert_eq!(outcome.feedback, "");
        assert_eq!(outcome.stage, Stage::MAX);
        assert_eq!(outcome.advanced_questions.unwrap().len(), 3);
        assert!(outcome.related_concepts.is_some());
    }

    #[tokio::test]
    async fn test_concept_prefilter_skips_equivalence() {
        let fx = fixture(CardType::Concept, 2);
        let mut oracle = oracle_with_similarity(0.60);
        oracle.expect_is_equivalent().times(0);
        oracle.expect_generate_feedback().times(0);
        let svc = service(&fx, oracle);

        let outcome = svc.process_review(&fx.card.id, "unrelated", false).await.unwrap();

        assert!(!outcome.is_correct);
        assert!(outcome.feedback.contains("0.60"));
        assert!(outcome.retry_allowed);
    }

    #[tokio::test]
    async fn test_concept_not_equivalent_gets_generated_feedback() {
        let fx = fixture(CardType::Concept, 1);
        let mut oracle = oracle_with_similarity(0.85);
        oracle.expect_is_equivalent().times(1).returning(|_, _| Ok(false));
        oracle
            .expect_generate_feedback()
            .withf(|concept, answer, user, correct| {
                concept == "apple" && answer == "사과" && user == "close" && !*correct
            })
            .times(1)
            .returning(|_, _, _, _| Ok("Think about its colour.".to_string()));
        let svc = service(&fx, oracle);

        let outcome = svc.process_review(&fx.card.id, "close", false).await.unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.feedback, "Think about its colour.");
    }

    #[tokio::test]
    async fn test_unknown_card() {
        let fx = fixture(CardType::Word, 1);
        let mut oracle = MockReviewOracle::new();
        oracle.expect_similarity().times(0);
        let svc = service(&fx, oracle);

        let err = svc.process_review("missing", "x", false).await.unwrap_err();
        assert!(matches!(err, MnemoError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_oracle_failure_leaves_card_untouched() {
        let fx = fixture(CardType::Word, 3);
        let mut oracle = MockReviewOracle::new();
        oracle
            .expect_similarity()
            .returning(|_, _| Err(MnemoError::embedding("connection refused")));
        let svc = service(&fx, oracle);

        let err = svc.process_review(&fx.card.id, "x", true).await.unwrap_err();
        assert!(err.is_oracle_unavailable());

        let stored = fx.cards.require_card(&fx.card.id).unwrap();
        assert_eq!(stored.stage.get(), 3);
        assert!(stored.history.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_embeddings_leave_card_untouched() {
        let fx = fixture(CardType::Word, 2);
        let mut oracle = MockReviewOracle::new();
        oracle.expect_similarity().returning(|_, _| {
            Err(MnemoError::OracleUnavailable {
                message: "Embeddings of length 0 and 3 cannot be compared".into(),
                code: ErrorCode::OrcInvalidResponse,
                collaborator: Collaborator::Embedder,
                source: None,
            })
        });
        let svc = service(&fx, oracle);

        let err = svc.process_review(&fx.card.id, "x", true).await.unwrap_err();
        assert!(err.is_oracle_unavailable());
        assert_eq!(err.code(), ErrorCode::OrcInvalidResponse);

        let stored = fx.cards.require_card(&fx.card.id).unwrap();
        assert_eq!(stored.stage.get(), 2);
        assert!(stored.history.is_empty());
        assert_eq!(stored.next_review, fx.card.next_review);
    }
}
