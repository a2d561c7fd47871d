//! Ollama embedding provider implementation.

use async_trait::async_trait;

use mnemo_core::error::{MnemoError, MnemoResult};
use mnemo_core::traits::{Embedder, EmbedderConfig};

#[cfg(feature = "ollama")]
use ollama_rs::{generation::embeddings::request::GenerateEmbeddingsRequest, Ollama};

/// Ollama embedding provider.
pub struct OllamaEmbedder {
    #[cfg(feature = "ollama")]
    client: Ollama,
    config: EmbedderConfig,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder.
    pub fn new(config: EmbedderConfig) -> MnemoResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        let url = url::Url::parse(&base_url)
            .map_err(|e| MnemoError::Configuration(format!("Invalid Ollama URL: {}", e)))?;

        #[cfg(feature = "ollama")]
        let client = {
            let host = url.host_str().unwrap_or("localhost");
            let port = url.port().unwrap_or(11434);
            Ollama::new(format!("{}://{}", url.scheme(), host), port)
        };
        #[cfg(not(feature = "ollama"))]
        let _ = url;

        Ok(Self {
            #[cfg(feature = "ollama")]
            client,
            config,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[cfg(feature = "ollama")]
    async fn embed(&self, text: &str) -> MnemoResult<Vec<f32>> {
        let request = GenerateEmbeddingsRequest::new(self.config.model.clone(), text.into());

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| MnemoError::embedding(format!("Ollama embedding error: {}", e)))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MnemoError::embedding("Ollama returned no embedding"))
    }

    #[cfg(not(feature = "ollama"))]
    async fn embed(&self, _text: &str) -> MnemoResult<Vec<f32>> {
        Err(MnemoError::Configuration(
            "Ollama feature not enabled. Enable the 'ollama' feature.".to_string(),
        ))
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = OllamaEmbedder::new(EmbedderConfig {
            base_url: Some("::nope".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(MnemoError::Configuration(_))));
    }
}
