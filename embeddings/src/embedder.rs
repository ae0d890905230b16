//! Text embedding by word-vector averaging.

use std::sync::Arc;

use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::WordVectorProvider;
use crate::similarity::average;

/// Turns a text into a single vector: the mean of its known token vectors.
///
/// Cloning is cheap; clones share the same provider.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn WordVectorProvider>,
    case_folding: bool,
}

impl Embedder {
    /// Create an embedder over the given provider.
    ///
    /// Fails with [`EmbeddingError::ProviderNotConfigured`] when the provider
    /// has nothing to offer; there is no fallback embedding strategy.
    pub fn new(provider: Arc<dyn WordVectorProvider>) -> Result<Self> {
        if !provider.is_available() {
            return Err(EmbeddingError::ProviderNotConfigured);
        }
        Ok(Self {
            provider,
            case_folding: false,
        })
    }

    /// Retry unknown tokens in lowercase.
    pub fn with_case_folding(mut self, enabled: bool) -> Self {
        self.case_folding = enabled;
        self
    }

    /// Native dimension of the underlying provider.
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Embed a text.
    ///
    /// Tokens without a known vector are skipped. When no token is known
    /// the result is an empty vector, which callers treat as "no signal".
    pub fn embed(&self, text: &str) -> Result<Embedding> {
        let vectors: Vec<Embedding> = text
            .split_whitespace()
            .filter_map(|token| self.lookup(token))
            .collect();

        debug!(
            "Embedding text with {} known tokens via {}",
            vectors.len(),
            self.provider.name()
        );

        average(&vectors)
    }

    fn lookup(&self, token: &str) -> Option<Embedding> {
        self.provider.lookup(token).or_else(|| {
            if self.case_folding {
                let lower = token.to_lowercase();
                (lower != token)
                    .then(|| self.provider.lookup(&lower))
                    .flatten()
            } else {
                None
            }
        })
    }
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("provider", &self.provider.name())
            .field("dimension", &self.provider.dimension())
            .field("case_folding", &self.case_folding)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::WordVectorTable;
    use pretty_assertions::assert_eq;

    fn embedder() -> Embedder {
        let table = WordVectorTable::from_entries([
            ("cat", vec![1.0, 0.0]),
            ("dog", vec![0.0, 1.0]),
            ("fish", vec![3.0, 3.0]),
        ])
        .unwrap();
        Embedder::new(Arc::new(table)).unwrap()
    }

    #[test]
    fn test_embed_averages_known_tokens() {
        let embedding = embedder().embed("cat dog").unwrap();
        assert_eq!(embedding, vec![0.5, 0.5]);
    }

    #[test]
    fn test_embed_skips_unknown_tokens() {
        let embedding = embedder().embed("the cat   sat\non\tthe mat").unwrap();
        assert_eq!(embedding, vec![1.0, 0.0]);
    }

    #[test]
    fn test_embed_no_known_tokens_is_empty() {
        assert!(embedder().embed("quantum entanglement").unwrap().is_empty());
        assert!(embedder().embed("").unwrap().is_empty());
    }

    #[test]
    fn test_case_folding() {
        assert!(embedder().embed("CAT").unwrap().is_empty());

        let folded = embedder().with_case_folding(true);
        assert_eq!(folded.embed("CAT Dog").unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_unavailable_provider_is_fatal() {
        let result = Embedder::new(Arc::new(WordVectorTable::default()));
        assert!(matches!(result, Err(EmbeddingError::ProviderNotConfigured)));
    }

    #[test]
    fn test_dimension() {
        assert_eq!(embedder().dimension(), 2);
    }
}
