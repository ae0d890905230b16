//! Documents held by the store.

use commitrag_embeddings::Embedding;
use serde::{Deserialize, Serialize};

/// A text document and, once ingested, its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, not required to be unique.
    pub id: String,

    /// Raw text body.
    pub content: String,

    /// Set once by the store at ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    embedding: Option<Embedding>,
}

impl Document {
    /// Create a document that has not been embedded yet.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding: None,
        }
    }

    /// The embedding, if the document has been ingested.
    pub fn embedding(&self) -> Option<&[f64]> {
        self.embedding.as_deref()
    }

    /// Whether ingestion found any known token in the content.
    pub fn has_signal(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub(crate) fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_no_embedding() {
        let doc = Document::new("a", "the cat sat");
        assert_eq!(doc.embedding(), None);
        assert!(!doc.has_signal());
    }

    #[test]
    fn test_empty_embedding_has_no_signal() {
        let doc = Document::new("a", "zzz").with_embedding(Vec::new());
        assert_eq!(doc.embedding(), Some(&[][..]));
        assert!(!doc.has_signal());
    }
}
