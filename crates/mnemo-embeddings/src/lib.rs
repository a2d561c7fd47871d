//! mnemo-embeddings - Embedding providers for mnemo.
//!
//! Answer similarity is the cosine of two embeddings, so any provider here
//! can back the review oracle's similarity score.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - text-embedding-3-small, text-embedding-3-large, etc.
//! - **Ollama** (feature: `ollama`) - Local embedding models via Ollama
//!
//! # Example
//!
//! ```ignore
//! use mnemo_embeddings::EmbedderFactory;
//!
//! // Multilingual model served by Ollama
//! let embedder = EmbedderFactory::ollama_with_model("bge-m3", 1024)?;
//!
//! // Or OpenAI
//! let embedder = EmbedderFactory::openai_with_model("text-embedding-3-small", 1536)?;
//! ```

mod factory;
mod ollama;
mod openai;

pub use factory::EmbedderFactory;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

// Re-export core types for convenience
pub use mnemo_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};
