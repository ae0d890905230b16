//! Append-only in-memory document store.

use commitrag_embeddings::{Embedder, EmbeddingError};
use tracing::debug;

use crate::document::Document;
use crate::error::Result;

/// Ordered collection of ingested documents.
///
/// Every stored document carries an embedding computed by the store's
/// [`Embedder`]. Non-empty embeddings all share one dimension. Documents are
/// never removed or modified once appended.
#[derive(Debug)]
pub struct DocumentStore {
    documents: Vec<Document>,
    embedder: Embedder,
    dimension: Option<usize>,
}

impl DocumentStore {
    /// Create an empty store that embeds with `embedder`.
    pub fn new(embedder: Embedder) -> Self {
        Self {
            documents: Vec::new(),
            embedder,
            dimension: None,
        }
    }

    /// Embed `document.content` and append the document.
    ///
    /// Content without any known token is still stored, with an empty
    /// embedding. No deduplication by id takes place.
    pub fn append(&mut self, document: Document) -> Result<&Document> {
        let embedding = self.embedder.embed(&document.content)?;

        if !embedding.is_empty() {
            match self.dimension {
                Some(expected) if expected != embedding.len() => {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    }
                    .into());
                }
                Some(_) => {}
                None => self.dimension = Some(embedding.len()),
            }
        }

        debug!(
            "Appending document {} ({} dimensions)",
            document.id,
            embedding.len()
        );

        let index = self.documents.len();
        self.documents.push(document.with_embedding(embedding));
        Ok(&self.documents[index])
    }

    /// All documents in insertion order.
    pub fn all(&self) -> &[Document] {
        &self.documents
    }

    /// Get the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Dimension shared by the stored non-empty embeddings, once known.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// The embedder used for ingestion.
    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }
}
