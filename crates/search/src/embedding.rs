//! Embedding client contract (spec §4.1). The model that actually
//! produces vectors is explicitly out of scope — this module defines
//! the trait callers program against, plus a deterministic test double
//! in the style of the teacher's `embeddings::SimpleEmbedder`.

use async_trait::async_trait;

/// Whether a piece of text is a search query or an indexed passage.
/// Some embedding models (the `intfloat/e5-*` family, per
/// `original_source/embedding_service.py`'s `PREFIX_MODELS`) prepend a
/// different instruction string depending on this role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingRole {
    Query,
    Passage,
}

#[derive(thiserror::Error, Debug)]
pub enum EmbeddingError {
    #[error("embedding model failed: {0}")]
    ModelFailure(String),
    #[error("empty input text")]
    EmptyInput,
}

/// A client that turns text into fixed-dimension unit vectors.
/// Implementations are expected to L2-normalize their output; fusion
/// and vector search assume a unit-vector contract.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    fn dim(&self) -> usize;

    async fn embed(&self, text: &str, role: EmbeddingRole) -> Result<Vec<f32>, EmbeddingError>;

    async fn embed_batch(
        &self,
        texts: &[String],
        role: EmbeddingRole,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text, role).await?);
        }
        Ok(out)
    }
}

/// Deterministic, model-free embedder: hashes each character into a
/// bucket and L2-normalizes. Good enough to drive fusion/adjustment
/// tests end to end without a real model, mirroring the teacher's
/// `SimpleEmbedder`.
pub struct SimpleEmbedder {
    dim: usize,
}

impl SimpleEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for SimpleEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingClient for SimpleEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str, _role: EmbeddingRole) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut embedding = vec![0.0f32; self.dim];
        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % self.dim;
            embedding[idx] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        Ok(embedding)
    }
}

/// Wraps any `EmbeddingClient` and prepends the role-specific
/// instruction prefix the e5-style model family expects, per
/// `PREFIX_MODELS` in the original embedding service.
pub struct PrefixAwareEmbedder<E> {
    inner: E,
    query_prefix: String,
    passage_prefix: String,
}

impl<E: EmbeddingClient> PrefixAwareEmbedder<E> {
    pub fn new(inner: E, query_prefix: impl Into<String>, passage_prefix: impl Into<String>) -> Self {
        Self {
            inner,
            query_prefix: query_prefix.into(),
            passage_prefix: passage_prefix.into(),
        }
    }

    /// The standard e5 prefixes (`query: ` / `passage: `).
    pub fn e5(inner: E) -> Self {
        Self::new(inner, "query: ", "passage: ")
    }
}

#[async_trait]
impl<E: EmbeddingClient> EmbeddingClient for PrefixAwareEmbedder<E> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    async fn embed(&self, text: &str, role: EmbeddingRole) -> Result<Vec<f32>, EmbeddingError> {
        let prefix = match role {
            EmbeddingRole::Query => &self.query_prefix,
            EmbeddingRole::Passage => &self.passage_prefix,
        };
        let prefixed = format!("{prefix}{text}");
        self.inner.embed(&prefixed, role).await
    }
}
