//! Collaborator traits: model providers, the review oracle and card storage.

mod embedder;
mod llm;
mod oracle;
mod store;

pub use embedder::*;
pub use llm::*;
pub use oracle::*;
pub use store::*;
