//! Similarity search over a [`DocumentStore`].

use commitrag_embeddings::find_top_k;
use tracing::debug;

use crate::document::Document;
use crate::error::Result;
use crate::store::DocumentStore;

/// Number of documents returned when no limit is given.
pub const DEFAULT_SEARCH_LIMIT: usize = 3;

/// A search hit and its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument<'a> {
    /// The matched document.
    pub document: &'a Document,

    /// Cosine similarity, `None` when the document has no usable embedding.
    pub score: Option<f64>,
}

/// Ranks the documents of a store against a query.
#[derive(Debug, Clone, Copy)]
pub struct Retriever<'a> {
    store: &'a DocumentStore,
}

impl<'a> Retriever<'a> {
    /// Create a retriever over `store`.
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Return at most `limit` documents, most similar first.
    ///
    /// Documents with equal scores keep their store order; documents without
    /// a usable embedding come last.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<&'a Document>> {
        Ok(self
            .search_scored(query, limit)?
            .into_iter()
            .map(|hit| hit.document)
            .collect())
    }

    /// Like [`Retriever::search`], keeping the score of each hit.
    pub fn search_scored(&self, query: &str, limit: usize) -> Result<Vec<ScoredDocument<'a>>> {
        if limit == 0 || self.store.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.store.embedder().embed(query)?;
        if query_embedding.is_empty() {
            debug!("Query has no known tokens, falling back to store order");
        }

        let candidates = self
            .store
            .all()
            .iter()
            .map(|doc| (doc, doc.embedding()));

        let hits: Vec<ScoredDocument<'a>> = find_top_k(&query_embedding, candidates, limit)
            .into_iter()
            .map(|r| ScoredDocument {
                document: r.item,
                score: r.score,
            })
            .collect();

        debug!(
            "Search returned {} of {} documents",
            hits.len(),
            self.store.len()
        );
        Ok(hits)
    }
}
