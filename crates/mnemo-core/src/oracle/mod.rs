//! Review oracle implementation over the `Llm` and `Embedder` providers.

mod llm_oracle;
pub mod prompts;
mod similarity;

pub use llm_oracle::LlmOracle;
pub use similarity::{answer_similarity, cosine_similarity};
