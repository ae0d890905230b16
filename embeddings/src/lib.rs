//! # Embeddings
//!
//! Word-vector embeddings and similarity ranking for commitrag.
//!
//! ## Features
//!
//! - **Word-Vector Lookup**: Pretrained GloVe / word2vec tables behind a provider trait
//! - **Text Embedding**: One vector per text, the mean of its known token vectors
//! - **Similarity Ranking**: Cosine similarity and stable top-k selection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  WordVectorProvider ──► Embedder ──► Embedding                 │
//! │       │                                  │                      │
//! │       ▼                                  ▼                      │
//! │  WordVectorTable                 cosine_similarity / top-k      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod embedder;
pub mod error;
pub mod provider;
pub mod similarity;

pub use embedder::Embedder;
pub use error::{EmbeddingError, Result};
pub use provider::{WordVectorProvider, WordVectorTable};
pub use similarity::{SimilarityResult, average, cosine_similarity, find_top_k, normalize};

/// A dense vector embedding.
pub type Embedding = Vec<f64>;
