//! Production review oracle backed by an embedder and a chat model.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::prompts;
use super::similarity::answer_similarity;
use crate::error::{Collaborator, ErrorCode, MnemoError, MnemoResult};
use crate::traits::{hint_applies, Embedder, GenerationOptions, Llm, ReviewOracle};
use crate::types::{CardType, Message, Stage};

/// [`ReviewOracle`] that scores with embeddings and judges with an LLM.
pub struct LlmOracle {
    llm: Arc<dyn Llm>,
    embedder: Arc<dyn Embedder>,
}

impl LlmOracle {
    pub fn new(llm: Arc<dyn Llm>, embedder: Arc<dyn Embedder>) -> Self {
        Self { llm, embedder }
    }

    async fn complete(&self, prompt: String, options: Option<GenerationOptions>) -> MnemoResult<String> {
        let response = self
            .llm
            .generate(&[Message::user(prompt)], options)
            .await
            .map_err(|e| unavailable(Collaborator::Llm, e))?;
        Ok(prompts::clean_response(response.content_or_empty()))
    }
}

/// Anything a collaborator throws is reported as the oracle being unavailable.
fn unavailable(collaborator: Collaborator, err: MnemoError) -> MnemoError {
    if err.is_oracle_unavailable() {
        return err;
    }
    let code = match collaborator {
        Collaborator::Llm => ErrorCode::OrcLlmFailed,
        Collaborator::Embedder => ErrorCode::OrcEmbeddingFailed,
    };
    MnemoError::OracleUnavailable {
        message: err.to_string(),
        code,
        collaborator,
        source: Some(Box::new(err)),
    }
}

/// Empty, mismatched, zero or non-finite vectors from the embedder.
fn invalid_embeddings(message: String) -> MnemoError {
    MnemoError::OracleUnavailable {
        message,
        code: ErrorCode::OrcInvalidResponse,
        collaborator: Collaborator::Embedder,
        source: None,
    }
}

#[async_trait]
impl ReviewOracle for LlmOracle {
    #[instrument(skip_all)]
    async fn similarity(&self, a: &str, b: &str) -> MnemoResult<f32> {
        let vectors = self
            .embedder
            .embed_batch(&[a.to_string(), b.to_string()])
            .await
            .map_err(|e| unavailable(Collaborator::Embedder, e))?;

        let [va, vb] = vectors.as_slice() else {
            return Err(invalid_embeddings(format!(
                "Expected 2 embeddings, got {}",
                vectors.len()
            )));
        };

        let score = answer_similarity(va, vb).ok_or_else(|| {
            invalid_embeddings(format!(
                "Embeddings of length {} and {} cannot be compared",
                va.len(),
                vb.len()
            ))
        })?;
        debug!(score, model = self.embedder.model_name(), "Computed similarity");
        Ok(score)
    }

    async fn is_equivalent(&self, correct: &str, user: &str) -> MnemoResult<bool> {
        let options = GenerationOptions {
            temperature: Some(0.0),
            max_tokens: Some(8),
        };
        let reply = self
            .complete(prompts::equivalence_prompt(correct, user), Some(options))
            .await?;
        let equivalent = prompts::parse_yes_no(&reply);
        debug!(equivalent, reply = %reply, "Equivalence verdict");
        Ok(equivalent)
    }

    async fn generate_feedback(
        &self,
        _concept: &str,
        answer: &str,
        user_answer: &str,
        is_correct: bool,
    ) -> MnemoResult<String> {
        self.complete(prompts::feedback_prompt(answer, user_answer, is_correct), None)
            .await
    }

    async fn generate_related_concepts(&self, concept: &str, k: usize) -> MnemoResult<Vec<String>> {
        let reply = self
            .complete(prompts::related_concepts_prompt(concept, k), None)
            .await?;
        let mut items = prompts::parse_list(&reply);
        items.truncate(k);
        Ok(items)
    }

    async fn generate_advanced_questions(&self, concept: &str, n: usize) -> MnemoResult<Vec<String>> {
        let reply = self
            .complete(prompts::advanced_questions_prompt(concept, n), None)
            .await?;
        let mut items = prompts::parse_list(&reply);
        items.truncate(n);
        Ok(items)
    }

    async fn generate_hint(
        &self,
        concept: &str,
        answer: &str,
        stage: Stage,
        card_type: CardType,
    ) -> MnemoResult<String> {
        if !hint_applies(stage, card_type) {
            return Ok(String::new());
        }
        match prompts::hint_prompt(concept, answer, stage, card_type) {
            Some(prompt) => self.complete(prompt, None).await,
            None => Ok(String::new()),
        }
    }

    async fn generate_concept_definition(&self, concept: &str) -> MnemoResult<String> {
        self.complete(prompts::concept_definition_prompt(concept), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LlmResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replies with canned text and remembers prompts.
    struct ScriptedLlm {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Llm for ScriptedLlm {
        async fn generate(
            &self,
            messages: &[Message],
            _options: Option<GenerationOptions>,
        ) -> MnemoResult<LlmResponse> {
            self.prompts.lock().unwrap().push(messages[0].content.clone());
            Ok(LlmResponse {
                content: Some(self.reply.clone()),
                usage: None,
            })
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl Llm for FailingLlm {
        async fn generate(
            &self,
            _messages: &[Message],
            _options: Option<GenerationOptions>,
        ) -> MnemoResult<LlmResponse> {
            Err(MnemoError::network("connection refused"))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    /// Maps known strings to fixed vectors.
    struct TableEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for TableEmbedder {
        async fn embed(&self, text: &str) -> MnemoResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(match text {
                "cat" => vec![1.0, 0.0],
                "kitten" => vec![1.0, 1.0],
                _ => vec![0.0, 1.0],
            })
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "table"
        }
    }

    fn embedder() -> Arc<TableEmbedder> {
        Arc::new(TableEmbedder {
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_similarity_uses_embeddings() {
        let emb = embedder();
        let oracle = LlmOracle::new(ScriptedLlm::new(""), emb.clone());

        assert_eq!(oracle.similarity("cat", "cat").await.unwrap(), 1.0);
        let kitten = oracle.similarity("cat", "kitten").await.unwrap();
        assert!((kitten - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert_eq!(oracle.similarity("cat", "dog").await.unwrap(), 0.0);
        assert_eq!(emb.calls.load(Ordering::SeqCst), 6);
    }

    /// Returns malformed vectors for a few sentinel inputs.
    struct MalformedEmbedder;

    #[async_trait]
    impl Embedder for MalformedEmbedder {
        async fn embed(&self, text: &str) -> MnemoResult<Vec<f32>> {
            Ok(match text {
                "empty" => vec![],
                "nan" => vec![f32::NAN, 1.0],
                "zero" => vec![0.0, 0.0],
                "wide" => vec![1.0, 0.0, 0.0],
                _ => vec![1.0, 0.0],
            })
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "malformed"
        }
    }

    #[tokio::test]
    async fn test_malformed_embeddings_are_oracle_unavailable() {
        let oracle = LlmOracle::new(ScriptedLlm::new(""), Arc::new(MalformedEmbedder));

        for input in ["empty", "nan", "zero", "wide"] {
            let err = oracle.similarity("answer", input).await.unwrap_err();
            assert!(err.is_oracle_unavailable(), "{} gave {:?}", input, err);
            assert_eq!(err.code(), ErrorCode::OrcInvalidResponse);
        }
        assert_eq!(oracle.similarity("answer", "answer").await.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_is_equivalent() {
        let yes = LlmOracle::new(ScriptedLlm::new("YES"), embedder());
        assert!(yes.is_equivalent("a", "b").await.unwrap());

        let no = LlmOracle::new(ScriptedLlm::new("NO"), embedder());
        assert!(!no.is_equivalent("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_hint_not_generated_outside_gated_stages() {
        let llm = ScriptedLlm::new("a hint");
        let oracle = LlmOracle::new(llm.clone(), embedder());

        let hint = oracle
            .generate_hint("apple", "사과", Stage::new(2).unwrap(), CardType::Word)
            .await
            .unwrap();
        assert_eq!(hint, "");
        assert!(llm.prompts.lock().unwrap().is_empty());

        let hint = oracle
            .generate_hint("apple", "사과", Stage::new(3).unwrap(), CardType::Word)
            .await
            .unwrap();
        assert_eq!(hint, "a hint");
        assert_eq!(llm.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_related_concepts_truncated_to_k() {
        let oracle = LlmOracle::new(ScriptedLlm::new("a, b, c, d, e, f"), embedder());
        let related = oracle.generate_related_concepts("x", 5).await.unwrap();
        assert_eq!(related, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_llm_failure_is_oracle_unavailable() {
        let oracle = LlmOracle::new(Arc::new(FailingLlm), embedder());
        let err = oracle.is_equivalent("a", "b").await.unwrap_err();
        assert!(err.is_oracle_unavailable());
        assert_eq!(err.code(), ErrorCode::OrcLlmFailed);
    }
}
