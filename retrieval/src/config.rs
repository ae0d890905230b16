//! Configuration for the RAG system.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};
use crate::generator::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, PromptTemplate};
use crate::retriever::DEFAULT_SEARCH_LIMIT;
use crate::sources::DEFAULT_COMMAND_TIMEOUT;

/// Configuration for the RAG system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RagConfig {
    /// Word-vector configuration.
    pub embedding: EmbeddingConfig,

    /// Search configuration.
    pub retrieval: SearchConfig,

    /// Generation service configuration.
    pub generation: GenerationConfig,

    /// Commands whose output is ingested.
    pub commands: CommandsConfig,
}

impl RagConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| RetrievalError::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            RetrievalError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the word-vector file.
    pub fn with_vectors_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.embedding.vectors_path = Some(path.into());
        self
    }

    /// Set the generation configuration.
    pub fn with_generation(mut self, config: GenerationConfig) -> Self {
        self.generation = config;
        self
    }

    /// Set the number of documents used as context.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.retrieval.limit = limit;
        self
    }
}

/// Configuration for the word-vector provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// GloVe / word2vec text file.
    pub vectors_path: Option<PathBuf>,

    /// Retry unknown tokens in lowercase.
    pub case_folding: bool,
}

/// Configuration for search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Documents retrieved per query.
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Configuration for the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Service base URL.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Prompt template overriding the built-in one.
    pub prompt_template: Option<String>,
}

impl GenerationConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective prompt template.
    pub fn template(&self) -> PromptTemplate {
        self.prompt_template
            .as_deref()
            .map(PromptTemplate::new)
            .unwrap_or_default()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            prompt_template: None,
        }
    }
}

/// Configuration for command ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandsConfig {
    /// Directory the commands run in.
    pub working_dir: Option<PathBuf>,

    /// Per-command timeout in seconds.
    pub timeout_secs: u64,

    /// Commands whose output becomes a document.
    pub ingest: Vec<String>,
}

impl CommandsConfig {
    /// Per-command timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            working_dir: None,
            timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            ingest: vec!["git diff".to_string(), "git status".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.retrieval.limit, 3);
        assert_eq!(config.generation.base_url, "http://localhost:11434");
        assert_eq!(config.generation.timeout(), Duration::from_secs(120));
        assert_eq!(config.commands.ingest, vec!["git diff", "git status"]);
        assert_eq!(config.generation.template(), PromptTemplate::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(RagConfig::from_toml_str("").unwrap(), RagConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = RagConfig::from_toml_str(
            r#"
            [embedding]
            vectors_path = "/opt/glove.6B.300d.txt"

            [generation]
            model = "mistral"
            prompt_template = "{context} => {query}"

            [commands]
            ingest = ["git diff --staged"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.embedding.vectors_path,
            Some(PathBuf::from("/opt/glove.6B.300d.txt"))
        );
        assert_eq!(config.generation.model, "mistral");
        assert_eq!(config.generation.base_url, "http://localhost:11434");
        assert_eq!(config.generation.template().render("c", "q"), "c => q");
        assert_eq!(config.commands.ingest, vec!["git diff --staged"]);
        assert_eq!(config.commands.timeout_secs, 30);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RagConfig::from_toml_str("[retrieval]\nlimt = 4\n").unwrap_err();
        assert!(matches!(err, RetrievalError::Config(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RagConfig::load(dir.path().join("commitrag.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Config(_)));
    }
}
