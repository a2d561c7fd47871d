//! Configuration system for mnemo.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{MnemoError, MnemoResult};
use crate::traits::{EmbedderConfig, EmbedderProvider, LlmConfig};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAI,
    #[default]
    Ollama,
}

impl LlmProvider {
    /// Parse a provider name, case-insensitively.
    pub fn parse(name: &str) -> MnemoResult<Self> {
        match name.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(MnemoError::UnsupportedProvider {
                provider: name.to_string(),
            }),
        }
    }
}

impl EmbedderProvider {
    /// Parse a provider name, case-insensitively.
    pub fn parse(name: &str) -> MnemoResult<Self> {
        match name.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(MnemoError::UnsupportedProvider {
                provider: name.to_string(),
            }),
        }
    }
}

/// Provider configuration with type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Provider type.
    pub provider: LlmProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: LlmConfig,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            config: LlmConfig {
                model: "gemma3:4b-it-qat".to_string(),
                ..Default::default()
            },
        }
    }
}

/// Embedder provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderProviderConfig {
    /// Provider type.
    pub provider: EmbedderProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: EmbedderConfig,
}

impl Default for EmbedderProviderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedderProvider::Ollama,
            config: EmbedderConfig {
                model: "bge-m3".to_string(),
                embedding_dims: 1024,
                ..Default::default()
            },
        }
    }
}

/// Where cards are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Card storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// SQLite database file. `:memory:` opens a private in-memory database.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            db_path: data_dir().join("cards.db"),
        }
    }
}

/// Interval attached to a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInterval {
    pub stage: u8,
    pub seconds: u64,
}

/// Stage to review-interval table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub stage_intervals: Vec<StageInterval>,
    /// Used for any stage missing from `stage_intervals`.
    pub fallback_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            stage_intervals: vec![
                StageInterval { stage: 1, seconds: 10 * 60 },
                StageInterval { stage: 2, seconds: 24 * 60 * 60 },
                StageInterval { stage: 3, seconds: 7 * 24 * 60 * 60 },
                StageInterval { stage: 4, seconds: 30 * 24 * 60 * 60 },
            ],
            fallback_secs: 24 * 60 * 60,
        }
    }
}

/// Fixed feedback texts. `{score}` is replaced by the similarity with two decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackMessages {
    /// Word answer close to, but below, the correct threshold.
    pub word_typo: String,
    /// Word answer below the near threshold.
    pub word_far: String,
    /// Concept answer rejected by the similarity pre-filter.
    pub concept_far: String,
}

impl Default for FeedbackMessages {
    fn default() -> Self {
        Self {
            word_typo: "Please check for typos.".to_string(),
            word_far: "Similarity {score} differs from the answer.".to_string(),
            concept_far: "Similarity {score} differs substantially from the key points of the answer."
                .to_string(),
        }
    }
}

impl FeedbackMessages {
    /// Substitute `{score}` in a template.
    pub fn render(template: &str, score: f32) -> String {
        template.replace("{score}", &format!("{:.2}", score))
    }
}

/// Review evaluator tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub word_correct_threshold: f32,
    pub word_near_threshold: f32,
    pub concept_pass_threshold: f32,
    pub related_concepts_count: usize,
    pub advanced_questions_count: usize,
    /// Delay applied after a failed retry. Independent of the stage-1 interval.
    pub retry_reset_delay_secs: u64,
    pub messages: FeedbackMessages,
}

/// Word answers at or above this similarity are correct.
pub const WORD_SIM_CORRECT: f32 = 0.95;
/// Word answers at or above this similarity (but below correct) get the typo message.
pub const WORD_SIM_NEAR: f32 = 0.72;
/// Concept answers below this similarity are rejected without an equivalence check.
pub const CONCEPT_SIM_PASS: f32 = 0.75;
/// Delay before a card reset by a failed retry comes due again.
pub const RETRY_RESET_DELAY_SECS: u64 = 10 * 60;

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            word_correct_threshold: WORD_SIM_CORRECT,
            word_near_threshold: WORD_SIM_NEAR,
            concept_pass_threshold: CONCEPT_SIM_PASS,
            related_concepts_count: 5,
            advanced_questions_count: 3,
            retry_reset_delay_secs: RETRY_RESET_DELAY_SECS,
            messages: FeedbackMessages::default(),
        }
    }
}

/// Due-card notifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub run_on_start: bool,
    /// JSON file holding the webhook URL.
    pub webhook_settings_path: PathBuf,
    /// Link included in each reminder.
    pub review_url: String,
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            run_on_start: true,
            webhook_settings_path: data_dir().join("webhook_config.json"),
            review_url: "http://localhost:3000/review".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MnemoConfig {
    /// LLM configuration.
    pub llm: LlmProviderConfig,
    /// Embedder configuration.
    pub embedder: EmbedderProviderConfig,
    /// Card storage.
    pub storage: StorageConfig,
    /// Review intervals.
    pub schedule: ScheduleConfig,
    /// Review evaluator tuning.
    pub review: ReviewConfig,
    /// Due-card notifications.
    pub notifier: NotifierConfig,
}

/// `~/.mnemo`, or `.mnemo` when no home directory is known.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".mnemo"))
        .unwrap_or_else(|| PathBuf::from(".mnemo"))
}

impl MnemoConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> MnemoResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| MnemoError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| MnemoError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| MnemoError::Configuration(e.to_string())),
            _ => Err(MnemoError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> MnemoResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `MNEMO_*` environment overrides.
    pub fn with_env_overrides(mut self) -> MnemoResult<Self> {
        if let Ok(provider) = std::env::var("MNEMO_LLM_PROVIDER") {
            self.llm.provider = LlmProvider::parse(&provider)?;
        }
        if let Ok(model) = std::env::var("MNEMO_LLM_MODEL") {
            self.llm.config.model = model;
        }
        if let Ok(url) = std::env::var("MNEMO_LLM_BASE_URL") {
            self.llm.config.base_url = Some(url);
        }
        if let Ok(provider) = std::env::var("MNEMO_EMBEDDER_PROVIDER") {
            self.embedder.provider = EmbedderProvider::parse(&provider)?;
        }
        if let Ok(model) = std::env::var("MNEMO_EMBEDDER_MODEL") {
            self.embedder.config.model = model;
        }
        if let Ok(url) = std::env::var("MNEMO_EMBEDDER_BASE_URL") {
            self.embedder.config.base_url = Some(url);
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.llm.config.api_key.get_or_insert(api_key.clone());
            self.embedder.config.api_key.get_or_insert(api_key);
        }

        if let Ok(backend) = std::env::var("MNEMO_STORAGE") {
            self.storage.backend = match backend.to_lowercase().as_str() {
                "memory" => StorageBackend::Memory,
                "sqlite" => StorageBackend::Sqlite,
                other => {
                    return Err(MnemoError::Configuration(format!(
                        "Unknown storage backend '{}'. Use 'sqlite' or 'memory'",
                        other
                    )))
                }
            };
        }
        if let Ok(path) = std::env::var("MNEMO_DB_PATH") {
            self.storage.db_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("MNEMO_WEBHOOK_CONFIG_PATH") {
            self.notifier.webhook_settings_path = PathBuf::from(path);
        }
        if let Ok(secs) = std::env::var("MNEMO_NOTIFY_INTERVAL_SECS") {
            self.notifier.interval_secs = secs.parse().map_err(|_| {
                MnemoError::Configuration(format!("Invalid MNEMO_NOTIFY_INTERVAL_SECS: {}", secs))
            })?;
        }
        if std::env::var("MNEMO_DISABLE_NOTIFIER").is_ok() {
            self.notifier.enabled = false;
        }

        Ok(self)
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> MnemoConfigBuilder {
        MnemoConfigBuilder::default()
    }
}

/// Builder for MnemoConfig.
#[derive(Default)]
pub struct MnemoConfigBuilder {
    config: MnemoConfig,
}

impl MnemoConfigBuilder {
    /// Set LLM configuration.
    pub fn llm(mut self, config: LlmProviderConfig) -> Self {
        self.config.llm = config;
        self
    }

    /// Set embedder configuration.
    pub fn embedder(mut self, config: EmbedderProviderConfig) -> Self {
        self.config.embedder = config;
        self
    }

    /// Keep cards in memory only.
    pub fn in_memory(mut self) -> Self {
        self.config.storage.backend = StorageBackend::Memory;
        self
    }

    /// Store cards in the given SQLite file.
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage.backend = StorageBackend::Sqlite;
        self.config.storage.db_path = path.into();
        self
    }

    /// Set the review interval table.
    pub fn schedule(mut self, config: ScheduleConfig) -> Self {
        self.config.schedule = config;
        self
    }

    /// Set review evaluator tuning.
    pub fn review(mut self, config: ReviewConfig) -> Self {
        self.config.review = config;
        self
    }

    /// Set notifier configuration.
    pub fn notifier(mut self, config: NotifierConfig) -> Self {
        self.config.notifier = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MnemoConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_review_policy() {
        let config = MnemoConfig::default();
        assert_eq!(config.review.word_correct_threshold, 0.95);
        assert_eq!(config.review.word_near_threshold, 0.72);
        assert_eq!(config.review.concept_pass_threshold, 0.75);
        assert_eq!(config.review.related_concepts_count, 5);
        assert_eq!(config.review.advanced_questions_count, 3);
        assert_eq!(config.review.retry_reset_delay_secs, 600);
        assert_eq!(config.schedule.fallback_secs, 86_400);
        assert_eq!(config.notifier.interval_secs, 60);
    }

    #[test]
    fn test_render_score() {
        let text = FeedbackMessages::render("Similarity {score} differs", 0.5);
        assert_eq!(text, "Similarity 0.50 differs");
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"

[storage]
backend = "memory"

[review]
related_concepts_count = 2

[[schedule.stage_intervals]]
stage = 1
seconds = 30
"#
        )
        .unwrap();

        let config = MnemoConfig::from_file(file.path()).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::OpenAI);
        assert_eq!(config.llm.config.model, "gpt-4o-mini");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.review.related_concepts_count, 2);
        assert_eq!(config.review.advanced_questions_count, 3);
        assert_eq!(config.schedule.stage_intervals.len(), 1);
        assert_eq!(config.schedule.fallback_secs, 86_400);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            MnemoConfig::from_file(file.path()),
            Err(MnemoError::Configuration(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = MnemoConfig::builder()
            .in_memory()
            .review(ReviewConfig {
                related_concepts_count: 1,
                ..Default::default()
            })
            .build();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.review.related_concepts_count, 1);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("OpenAI").unwrap(), LlmProvider::OpenAI);
        assert!(matches!(
            EmbedderProvider::parse("cohere"),
            Err(MnemoError::UnsupportedProvider { .. })
        ));
    }
}
