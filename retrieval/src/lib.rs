//! # Retrieval Engine
//!
//! This crate provides the retrieval-augmented generation pipeline:
//!
//! - **Document Store**: Append-only, in-memory, one embedding per document
//! - **Retriever**: Cosine-similarity top-k search with stable tie-breaking
//! - **Response Generator**: Prompt templating and a local LLM call
//! - **Sources**: Files and shell command output as documents
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          RagSystem                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │   Sources    │  │   Embedder   │  │  Generation  │          │
//! │  │ files / cmds │  │ word vectors │  │    client    │          │
//! │  └──────────────┘  └──────────────┘  └──────────────┘          │
//! │         │                │                  ▲                   │
//! │         ▼                ▼                  │                   │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │  Document    │─►│  Retriever   │─►│   Response   │          │
//! │  │    Store     │  │   (top-k)    │  │  Generator   │          │
//! │  └──────────────┘  └──────────────┘  └──────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use commitrag_retrieval::{CommandSpec, RagSystem};
//!
//! let rag = RagSystem::builder()
//!     .with_vectors_path("glove.6B.300d.txt")
//!     .build()
//!     .await?;
//!
//! rag.add_command_output(&CommandSpec::new("git diff")).await?;
//! let message = rag.try_generate("Write a commit message").await?;
//! ```

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod generator;
pub mod retriever;
pub mod sources;
pub mod store;

pub use config::RagConfig;
pub use document::Document;
pub use engine::{IngestReport, RagSystem, RagSystemBuilder, SystemStats};
pub use error::{GenerationError, Result, RetrievalError};
pub use generator::{GenerationClient, OllamaClient, PromptTemplate, ResponseGenerator};
pub use retriever::{DEFAULT_SEARCH_LIMIT, Retriever, ScoredDocument};
pub use sources::{CommandOutput, CommandSpec, load_file, run_command};
pub use store::DocumentStore;

// Re-export from dependencies for convenience
pub use commitrag_embeddings::{Embedder, Embedding, WordVectorProvider, WordVectorTable};
