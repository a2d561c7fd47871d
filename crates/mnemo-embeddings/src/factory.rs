//! Factory for creating embedding providers.

use std::sync::Arc;

use mnemo_core::config::EmbedderProviderConfig;
use mnemo_core::error::MnemoResult;
use mnemo_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};
use tracing::info;

use crate::ollama::OllamaEmbedder;
use crate::openai::OpenAIEmbedder;

/// Factory for creating embedding providers.
pub struct EmbedderFactory;

impl EmbedderFactory {
    /// Create an embedder from the given configuration.
    pub fn create(
        provider: EmbedderProvider,
        config: EmbedderConfig,
    ) -> MnemoResult<Arc<dyn Embedder>> {
        let embedder: Arc<dyn Embedder> = match provider {
            EmbedderProvider::OpenAI => Arc::new(OpenAIEmbedder::new(config)?),
            EmbedderProvider::Ollama => Arc::new(OllamaEmbedder::new(config)?),
        };
        info!(
            provider = ?provider,
            model = embedder.model_name(),
            dims = embedder.dimension(),
            "Embedder ready"
        );
        Ok(embedder)
    }

    /// Create from the `embedder` section of the main configuration.
    pub fn from_config(config: &EmbedderProviderConfig) -> MnemoResult<Arc<dyn Embedder>> {
        Self::create(config.provider, config.config.clone())
    }

    /// Create an OpenAI embedder with a specific model.
    pub fn openai_with_model(model: impl Into<String>, dims: usize) -> MnemoResult<Arc<dyn Embedder>> {
        let config = EmbedderConfig {
            model: model.into(),
            embedding_dims: dims,
            ..Default::default()
        };
        Self::create(EmbedderProvider::OpenAI, config)
    }

    /// Create an Ollama embedder with default configuration.
    pub fn ollama() -> MnemoResult<Arc<dyn Embedder>> {
        Self::from_config(&EmbedderProviderConfig::default())
    }

    /// Create an Ollama embedder with a specific model.
    pub fn ollama_with_model(model: impl Into<String>, dims: usize) -> MnemoResult<Arc<dyn Embedder>> {
        let config = EmbedderConfig {
            model: model.into(),
            embedding_dims: dims,
            ..Default::default()
        };
        Self::create(EmbedderProvider::Ollama, config)
    }
}
