//! Ollama LLM provider implementation.

use async_trait::async_trait;

use mnemo_core::error::{MnemoError, MnemoResult};
use mnemo_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse};
use mnemo_core::types::Message;

#[cfg(feature = "ollama")]
use mnemo_core::types::MessageRole;

#[cfg(feature = "ollama")]
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage, MessageRole as OllamaRole},
    generation::options::GenerationOptions as OllamaOptions,
    Ollama,
};

const DEFAULT_MODEL: &str = "gemma3:4b-it-qat";

/// Ollama LLM provider.
pub struct OllamaLlm {
    #[cfg(feature = "ollama")]
    client: Ollama,
    config: LlmConfig,
}

impl OllamaLlm {
    /// Create a new Ollama LLM provider.
    pub fn new(config: LlmConfig) -> MnemoResult<Self> {
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

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            #[cfg(feature = "ollama")]
            client,
            config,
        })
    }

    #[cfg(feature = "ollama")]
    fn message_to_ollama(msg: &Message) -> ChatMessage {
        let role = match msg.role {
            MessageRole::System => OllamaRole::System,
            MessageRole::User => OllamaRole::User,
            MessageRole::Assistant => OllamaRole::Assistant,
        };
        ChatMessage::new(role, msg.content.clone())
    }
}

#[async_trait]
impl Llm for OllamaLlm {
    #[cfg(feature = "ollama")]
    async fn generate(
        &self,
        messages: &[Message],
        options: Option<GenerationOptions>,
    ) -> MnemoResult<LlmResponse> {
        let options = options.unwrap_or_default();

        let ollama_messages: Vec<ChatMessage> =
            messages.iter().map(Self::message_to_ollama).collect();

        let sampling = OllamaOptions::default()
            .temperature(options.temperature.unwrap_or(self.config.temperature))
            .num_predict(options.max_tokens.unwrap_or(self.config.max_tokens) as i32);

        let request =
            ChatMessageRequest::new(self.config.model.clone(), ollama_messages).options(sampling);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| MnemoError::llm(format!("Ollama API error: {}", e)))?;

        Ok(LlmResponse {
            content: Some(response.message.content),
            usage: None,
        })
    }

    #[cfg(not(feature = "ollama"))]
    async fn generate(
        &self,
        _messages: &[Message],
        _options: Option<GenerationOptions>,
    ) -> MnemoResult<LlmResponse> {
        Err(MnemoError::Configuration(
            "Ollama feature not enabled. Enable the 'ollama' feature.".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
