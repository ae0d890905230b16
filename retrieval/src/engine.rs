//! RAG system facade.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use commitrag_embeddings::{Embedder, WordVectorTable};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::RagConfig;
use crate::document::Document;
use crate::error::{Result, RetrievalError};
use crate::generator::{GenerationClient, OllamaClient, ResponseGenerator};
use crate::retriever::Retriever;
use crate::sources::{CommandSpec, load_file, run_command};
use crate::store::DocumentStore;

/// Owns the document store and the response generator.
///
/// The store sits behind a read-write lock: ingestion takes the write side,
/// search and generation the read side, so the system can be shared between
/// tasks.
pub struct RagSystem {
    /// Configuration.
    config: RagConfig,

    /// Ingested documents.
    store: Arc<RwLock<DocumentStore>>,

    /// Prompt assembly and generation.
    generator: ResponseGenerator,
}

impl RagSystem {
    /// Create a new builder.
    pub fn builder() -> RagSystemBuilder {
        RagSystemBuilder::new()
    }

    /// Assemble a system from its parts.
    pub fn new(config: RagConfig, embedder: Embedder, client: Box<dyn GenerationClient>) -> Self {
        let generator = ResponseGenerator::new(client)
            .with_template(config.generation.template())
            .with_limit(config.retrieval.limit);

        info!(
            "RAG system ready (provider: {}, {} dimensions)",
            embedder.provider_name(),
            embedder.dimension()
        );

        Self {
            config,
            store: Arc::new(RwLock::new(DocumentStore::new(embedder))),
            generator,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Embed and store a document.
    pub async fn add_document(&self, document: Document) -> Result<()> {
        let mut store = self.store.write().await;
        store.append(document)?;
        Ok(())
    }

    /// Read a file and store it as a document.
    pub async fn add_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let document = load_file(path).await?;
        self.add_document(document).await
    }

    /// Run a command and store its output as a document.
    ///
    /// Returns `false` when the command printed nothing and no document
    /// was added.
    pub async fn add_command_output(&self, spec: &CommandSpec) -> Result<bool> {
        let output = run_command(spec).await?;
        if !output.success() {
            warn!(
                "Command `{}` exited with {:?}, ingesting its output anyway",
                output.command, output.exit_code
            );
        }
        match output.into_document() {
            Some(document) => {
                self.add_document(document).await?;
                Ok(true)
            }
            None => {
                debug!("Command `{}` produced no output", spec.command);
                Ok(false)
            }
        }
    }

    /// Ingest several files, skipping the ones that fail.
    pub async fn ingest_files<P: AsRef<Path>>(&self, paths: &[P]) -> IngestReport {
        let mut report = IngestReport::default();
        for path in paths {
            let path = path.as_ref();
            match self.add_file(path).await {
                Ok(()) => report.added += 1,
                Err(e) => {
                    warn!("Skipping {}: {e}", path.display());
                    report.failed.push((path.display().to_string(), e.to_string()));
                }
            }
        }
        report
    }

    /// Run the configured ingest commands, skipping the ones that fail.
    pub async fn ingest_commands(&self) -> IngestReport {
        let mut report = IngestReport::default();
        for command in &self.config.commands.ingest {
            let mut spec = CommandSpec::new(command).with_timeout(self.config.commands.timeout());
            if let Some(dir) = &self.config.commands.working_dir {
                spec = spec.with_working_dir(dir);
            }
            match self.add_command_output(&spec).await {
                Ok(true) => report.added += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Skipping command `{command}`: {e}");
                    report.failed.push((command.clone(), e.to_string()));
                }
            }
        }
        report
    }

    /// The `limit` documents most similar to `query`.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Document>> {
        let store = self.store.read().await;
        let documents = Retriever::new(&store).search(query, limit)?;
        Ok(documents.into_iter().cloned().collect())
    }

    /// Answer `query` from the stored documents.
    pub async fn try_generate(&self, query: &str) -> Result<String> {
        let store = self.store.read().await;
        self.generator
            .try_generate(&Retriever::new(&store), query)
            .await
    }

    /// Answer `query`, or return an empty string if generation fails.
    pub async fn generate(&self, query: &str) -> String {
        let store = self.store.read().await;
        self.generator.generate(&Retriever::new(&store), query).await
    }

    /// Snapshot of every stored document, in insertion order.
    pub async fn documents(&self) -> Vec<Document> {
        self.store.read().await.all().to_vec()
    }

    /// Get system statistics.
    pub async fn stats(&self) -> SystemStats {
        let store = self.store.read().await;
        SystemStats {
            documents: store.len(),
            documents_without_signal: store.all().iter().filter(|d| !d.has_signal()).count(),
            dimension: store.dimension(),
        }
    }
}

/// Outcome of a batch ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents added.
    pub added: usize,

    /// Sources that failed, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Statistics about the RAG system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStats {
    /// Number of stored documents.
    pub documents: usize,

    /// Documents whose content had no known token.
    pub documents_without_signal: usize,

    /// Embedding dimension, once a document has one.
    pub dimension: Option<usize>,
}

/// Builder for [`RagSystem`].
pub struct RagSystemBuilder {
    config: RagConfig,
    embedder: Option<Embedder>,
    client: Option<Box<dyn GenerationClient>>,
}

impl RagSystemBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
            embedder: None,
            client: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: RagConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the word-vector file.
    pub fn with_vectors_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.embedding.vectors_path = Some(path.into());
        self
    }

    /// Use an existing embedder instead of loading word vectors.
    pub fn with_embedder(mut self, embedder: Embedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Use a custom generation client instead of Ollama.
    pub fn with_client(mut self, client: Box<dyn GenerationClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the system.
    ///
    /// Without an explicit embedder the configured word-vector file is
    /// loaded; a missing path or unusable table is a fatal error.
    pub async fn build(self) -> Result<RagSystem> {
        let embedder = match self.embedder {
            Some(embedder) => embedder,
            None => {
                let path = self.config.embedding.vectors_path.as_ref().ok_or_else(|| {
                    RetrievalError::Config("embedding.vectors_path is not set".to_string())
                })?;
                let table = WordVectorTable::load(path).await?;
                Embedder::new(Arc::new(table))?
                    .with_case_folding(self.config.embedding.case_folding)
            }
        };

        let client = match self.client {
            Some(client) => client,
            None => {
                let generation = &self.config.generation;
                Box::new(
                    OllamaClient::new()
                        .with_base_url(&generation.base_url)
                        .with_model(&generation.model)
                        .with_timeout(generation.timeout()),
                )
            }
        };

        Ok(RagSystem::new(self.config, embedder, client))
    }
}

impl Default for RagSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}
