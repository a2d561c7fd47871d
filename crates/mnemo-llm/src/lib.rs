//! mnemo-llm - Chat-completion providers for mnemo.
//!
//! The review oracle uses these for equivalence verdicts, feedback, hints,
//! related concepts and advanced questions.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - GPT-4o, GPT-4.1, etc.
//! - **Ollama** (feature: `ollama`) - Local models via Ollama
//!
//! # Example
//!
//! ```ignore
//! use mnemo_llm::LlmFactory;
//!
//! // Local model via Ollama
//! let llm = LlmFactory::ollama_with_model("gemma3:4b-it-qat")?;
//!
//! // Or OpenAI
//! let llm = LlmFactory::openai_with_model("gpt-4o-mini")?;
//! ```

mod factory;
mod ollama;
mod openai;

pub use factory::LlmFactory;
pub use ollama::OllamaLlm;
pub use openai::OpenAIProvider;

// Re-export core types for convenience
pub use mnemo_core::config::LlmProvider;
pub use mnemo_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse};
