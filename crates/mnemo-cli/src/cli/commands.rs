//! # CLI Command Implementations

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _};
use chrono::{DateTime, Local, Utc};
use mnemo_core::config::{MnemoConfig, StorageBackend};
use mnemo_core::{
    hint_applies, open_store, Card, CardService, CardType, CardValidator, LlmOracle,
    ReviewOracle, ReviewOutcome, ReviewService, ScheduleService, Stats,
};
use mnemo_embeddings::EmbedderFactory;
use mnemo_llm::LlmFactory;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

/// Typed at an answer prompt to end the session.
const QUIT: &str = ":q";

/// Loaded configuration and the card service over the configured store.
///
/// The oracle is only built for commands that need it, so listing cards
/// works without any model provider configured.
pub struct Context {
    config: MnemoConfig,
    schedule: ScheduleService,
    cards: Arc<CardService>,
}

impl Context {
    pub fn load(config_path: Option<&Path>, database: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => MnemoConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?
                .with_env_overrides()?,
            None => MnemoConfig::from_env()?,
        };
        if let Some(path) = database {
            config.storage.backend = StorageBackend::Sqlite;
            config.storage.db_path = path;
        }
        debug!(db_path = %config.storage.db_path.display(), "Opening card store");

        let schedule = ScheduleService::new(&config.schedule);
        let store = open_store(&config.storage)?;
        let cards = Arc::new(CardService::new(store, schedule.clone()));

        Ok(Self {
            config,
            schedule,
            cards,
        })
    }

    fn oracle(&self) -> anyhow::Result<Arc<dyn ReviewOracle>> {
        let llm = LlmFactory::from_config(&self.config.llm)?;
        let embedder = EmbedderFactory::from_config(&self.config.embedder)?;
        Ok(Arc::new(LlmOracle::new(llm, embedder)))
    }
}

// =============================================================================
// CARD COMMANDS
// =============================================================================

pub async fn cmd_add(
    ctx: &Context,
    concept: &str,
    answer: &str,
    card_type: &str,
) -> anyhow::Result<()> {
    let card_type = CardType::parse(card_type)?;

    let answer = if card_type == CardType::Concept && answer.trim().is_empty() {
        CardValidator.validate_concept(concept)?;
        let definition = ctx
            .oracle()?
            .generate_concept_definition(concept)
            .await
            .context("generating a definition for the concept")?;
        println!("Generated answer: {}", definition);
        definition
    } else {
        answer.to_string()
    };

    let card = ctx.cards.create_card(concept, &answer, card_type)?;
    println!("Created {} card {}", card.card_type, card.id);
    Ok(())
}

pub fn cmd_list(ctx: &Context) -> anyhow::Result<()> {
    print_cards(&ctx.cards.get_all_cards()?, "No cards yet. Add one with `mnemo add`.");
    Ok(())
}

pub fn cmd_due(ctx: &Context) -> anyhow::Result<()> {
    print_cards(&ctx.cards.get_due_cards()?, "No cards due for review.");
    Ok(())
}

pub fn cmd_stats(ctx: &Context) -> anyhow::Result<()> {
    for line in format_stats(&ctx.cards.get_stats()?) {
        println!("{}", line);
    }
    Ok(())
}

pub fn cmd_delete(ctx: &Context, id: &str) -> anyhow::Result<()> {
    if !ctx.cards.delete_card(id)? {
        bail!("Card '{}' not found", id);
    }
    println!("Deleted card {}", id);
    Ok(())
}

// =============================================================================
// REVIEW SESSION
// =============================================================================

/// Walk the due cards, allowing exactly one retry per card when offered.
pub async fn cmd_review(ctx: &Context, all: bool) -> anyhow::Result<()> {
    let cards = if all {
        ctx.cards.get_all_cards()?
    } else {
        ctx.cards.get_due_cards()?
    };
    if cards.is_empty() {
        println!("No cards due for review.");
        return Ok(());
    }

    let oracle = ctx.oracle()?;
    let review = ReviewService::new(
        ctx.cards.clone(),
        oracle.clone(),
        ctx.schedule.clone(),
        &ctx.config.review,
    );
    let mut prompt = Prompt::stdin();

    println!("{} card(s) to review. Type {} to stop.", cards.len(), QUIT);

    for (i, card) in cards.iter().enumerate() {
        println!();
        println!(
            "[{}/{}] {} (stage {}, {})",
            i + 1,
            cards.len(),
            card.concept,
            card.stage,
            card.card_type
        );
        show_hint(oracle.as_ref(), card).await;

        let Some(answer) = prompt.ask("Answer: ").await? else {
            break;
        };
        let outcome = review.process_review(&card.id, &answer, false).await?;
        print_outcome(&outcome);

        if outcome.retry_allowed {
            println!("One more try.");
            let Some(answer) = prompt.ask("Answer: ").await? else {
                break;
            };
            let outcome = review.process_review(&card.id, &answer, true).await?;
            print_outcome(&outcome);
        }
    }

    println!();
    println!("Session finished.");
    Ok(())
}

async fn show_hint(oracle: &dyn ReviewOracle, card: &Card) {
    let masked = card.masked_hint();
    if !masked.is_empty() {
        println!("Hint: {}", masked);
        return;
    }
    if !hint_applies(card.stage, card.card_type) {
        return;
    }
    match oracle
        .generate_hint(&card.concept, &card.answer, card.stage, card.card_type)
        .await
    {
        Ok(hint) if !hint.is_empty() => println!("Hint: {}", hint),
        Ok(_) => {}
        Err(e) => warn!(card_id = %card.id, error = %e, "Hint unavailable"),
    }
}

/// Line-based answer input.
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input or the quit command.
    async fn ask(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        print!("{}", label);
        std::io::stdout().flush()?;
        Ok(parse_answer(self.lines.next_line().await?))
    }
}

fn parse_answer(line: Option<String>) -> Option<String> {
    let line = line?;
    let answer = line.trim();
    if answer == QUIT {
        None
    } else {
        Some(answer.to_string())
    }
}

// =============================================================================
// OUTPUT FORMATTING
// =============================================================================

fn local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn print_cards(cards: &[Card], empty_message: &str) {
    if cards.is_empty() {
        println!("{}", empty_message);
        return;
    }
    for card in cards {
        println!("{}", format_card(card));
    }
}

fn format_card(card: &Card) -> String {
    format!(
        "{}  {:<7}  stage {}  {:>5.1}%  next {}  {} -> {}",
        card.id,
        card.card_type,
        card.stage,
        card.success_rate(),
        local_time(card.next_review),
        card.concept,
        card.answer
    )
}

fn print_outcome(outcome: &ReviewOutcome) {
    for line in format_outcome(outcome) {
        println!("{}", line);
    }
}

fn format_outcome(outcome: &ReviewOutcome) -> Vec<String> {
    let mut lines = vec![if outcome.is_correct {
        "Correct!".to_string()
    } else {
        "Incorrect.".to_string()
    }];

    if !outcome.feedback.is_empty() {
        lines.push(format!("Feedback: {}", outcome.feedback));
    }

    if outcome.completed {
        lines.push("Card completed at the final stage.".to_string());
    } else if outcome.advanced {
        lines.push(format!("Advanced to stage {}.", outcome.stage));
    } else if !outcome.retry_allowed {
        lines.push(format!("Stage: {}", outcome.stage));
    }

    if let Some(next) = outcome.next_review {
        lines.push(format!("Next review: {}", local_time(next)));
    }

    if let Some(related) = outcome.related_concepts.as_ref().filter(|r| !r.is_empty()) {
        lines.push(format!("Related concepts: {}", related.join(", ")));
    }
    if let Some(questions) = outcome.advanced_questions.as_ref().filter(|q| !q.is_empty()) {
        lines.push("Questions to go further:".to_string());
        lines.extend(questions.iter().map(|q| format!("  - {}", q)));
    }
    lines
}

fn format_stats(stats: &Stats) -> Vec<String> {
    let mut lines = vec![format!("Total cards: {}", stats.total)];
    for (stage, count) in &stats.by_stage {
        lines.push(format!("  stage {}: {}", stage, count));
    }
    lines.push(format!(
        "Average success rate: {:.1}%",
        stats.average_success_rate
    ));
    lines.push(format!("Due now: {}", stats.due_count));
    lines
}
