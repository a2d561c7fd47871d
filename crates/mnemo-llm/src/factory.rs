//! Factory for creating LLM providers.

use std::sync::Arc;

use mnemo_core::config::{LlmProvider, LlmProviderConfig};
use mnemo_core::error::MnemoResult;
use mnemo_core::traits::{Llm, LlmConfig};
use tracing::info;

use crate::ollama::OllamaLlm;
use crate::openai::OpenAIProvider;

/// Factory for creating LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create an LLM provider from the given configuration.
    pub fn create(provider: LlmProvider, config: LlmConfig) -> MnemoResult<Arc<dyn Llm>> {
        let llm: Arc<dyn Llm> = match provider {
            LlmProvider::OpenAI => Arc::new(OpenAIProvider::new(config)?),
            LlmProvider::Ollama => Arc::new(OllamaLlm::new(config)?),
        };
        info!(provider = ?provider, model = llm.model_name(), "LLM provider ready");
        Ok(llm)
    }

    /// Create from the `llm` section of the main configuration.
    pub fn from_config(config: &LlmProviderConfig) -> MnemoResult<Arc<dyn Llm>> {
        Self::create(config.provider, config.config.clone())
    }

    /// Create an OpenAI LLM provider with default configuration.
    pub fn openai() -> MnemoResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::OpenAI, LlmConfig::default())
    }

    /// Create an OpenAI LLM provider with a specific model.
    pub fn openai_with_model(model: impl Into<String>) -> MnemoResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::OpenAI, config)
    }

    /// Create an Ollama LLM provider with default configuration.
    pub fn ollama() -> MnemoResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::Ollama, LlmConfig::default())
    }

    /// Create an Ollama LLM provider with a specific model.
    pub fn ollama_with_model(model: impl Into<String>) -> MnemoResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::Ollama, config)
    }
}
