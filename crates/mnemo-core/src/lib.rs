//! mnemo-core - Core library for mnemo.
//!
//! Cards, the stage schedule, the review evaluator and the collaborator
//! traits (LLM, embedder, review oracle, card store) for the mnemo
//! spaced-repetition trainer.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mnemo_core::{CardService, CardType, MemoryCardStore, ReviewConfig, ReviewService, ScheduleService};
//!
//! let cards = Arc::new(CardService::new(Arc::new(MemoryCardStore::new()), ScheduleService::default()));
//! let card = cards.create_card("apple", "사과", CardType::Word)?;
//!
//! let review = ReviewService::new(cards.clone(), oracle, ScheduleService::default(), &ReviewConfig::default());
//! let outcome = review.process_review(&card.id, "사과", false).await?;
//! ```

pub mod cards;
pub mod config;
pub mod error;
pub mod notify;
pub mod oracle;
pub mod review;
pub mod schedule;
pub mod stats;
pub mod storage;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use cards::CardService;
pub use config::{MnemoConfig, NotifierConfig, ReviewConfig, ScheduleConfig, StorageConfig};
pub use error::{Collaborator, ErrorCode, MnemoError, MnemoResult};
pub use notify::{DueCardNotifier, WebhookSettings, WebhookSettingsStore};
pub use oracle::LlmOracle;
pub use review::{ReviewService, Verdict};
pub use schedule::ScheduleService;
pub use stats::compute_stats;
pub use storage::{open_store, MemoryCardStore, SqliteCardStore};
pub use traits::{
    hint_applies, CardStore, Embedder, EmbedderConfig, EmbedderProvider, GenerationOptions, Llm,
    LlmConfig, LlmResponse, ReviewOracle, TokenUsage,
};
pub use types::{
    Card, CardType, Message, MessageRole, ReviewOutcome, ReviewRecord, Stage, Stats,
};
pub use validation::CardValidator;
