//! `commit-rag`: write a commit message for the current working tree.
//!
//! Runs the configured git commands, ingests their output (plus any extra
//! files) into a [`RagSystem`] and asks the local model for a message.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use commitrag_retrieval::RagConfig;
use commitrag_retrieval::RagSystem;
use tracing::{info, warn};

/// Default question put to the model.
pub const DEFAULT_QUERY: &str = "Write a concise git commit message describing these changes.";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "commit-rag",
    version,
    about = "Generate a git commit message from the working tree using a local LLM"
)]
pub struct Cli {
    /// Repository to inspect.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Word-vector file (GloVe / word2vec text format).
    #[arg(long)]
    pub vectors: Option<PathBuf>,

    /// Configuration file (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Model requested from the generation service.
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the generation service.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Number of documents used as context.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Generation timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra file to ingest; may be repeated.
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Question put to the model.
    #[arg(long, default_value = DEFAULT_QUERY)]
    pub query: String,
}

impl Cli {
    /// Merge the configuration file, if any, with command-line overrides.
    pub async fn resolve_config(&self) -> Result<RagConfig> {
        let mut config = match &self.config {
            Some(path) => RagConfig::load(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?,
            None => RagConfig::default(),
        };

        if let Some(vectors) = &self.vectors {
            config.embedding.vectors_path = Some(vectors.clone());
        }
        if let Some(model) = &self.model {
            config.generation.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.generation.base_url = endpoint.clone();
        }
        if let Some(limit) = self.limit {
            config.retrieval.limit = limit;
        }
        if let Some(timeout) = self.timeout {
            config.generation.timeout_secs = timeout;
        }
        config.commands.working_dir = Some(self.repo.clone());

        if config.embedding.vectors_path.is_none() {
            bail!("no word-vector file given; pass --vectors or set embedding.vectors_path");
        }
        Ok(config)
    }
}

/// Build the system, ingest the working tree and generate the message.
pub async fn run(cli: Cli) -> Result<String> {
    let config = cli.resolve_config().await?;

    let rag = RagSystem::builder()
        .with_config(config)
        .build()
        .await
        .context("initializing word vectors")?;

    let commands = rag.ingest_commands().await;
    let files = rag.ingest_files(&cli.files).await;
    for (source, reason) in commands.failed.iter().chain(&files.failed) {
        warn!("Not ingested: {source}: {reason}");
    }

    let stats = rag.stats().await;
    info!("Ingested {} documents", stats.documents);
    if stats.documents == 0 {
        warn!("Nothing to ingest; the model will answer without context");
    }

    let message = rag
        .try_generate(&cli.query)
        .await
        .context("generating commit message")?;
    Ok(message.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["commit-rag", "--vectors", "glove.txt"]).unwrap();
        assert_eq!(cli.repo, PathBuf::from("."));
        assert_eq!(cli.query, DEFAULT_QUERY);
        assert!(cli.files.is_empty());
    }

    #[test]
    fn test_parse_repeated_files() {
        let cli = Cli::try_parse_from([
            "commit-rag",
            "--file",
            "README.md",
            "--file",
            "CHANGELOG.md",
        ])
        .unwrap();
        assert_eq!(
            cli.files,
            vec![PathBuf::from("README.md"), PathBuf::from("CHANGELOG.md")]
        );
    }

    #[tokio::test]
    async fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("commitrag.toml");
        tokio::fs::write(
            &config_path,
            "[embedding]\nvectors_path = \"from-file.txt\"\n\n[generation]\nmodel = \"mistral\"\n",
        )
        .await
        .unwrap();

        let cli = Cli::try_parse_from([
            "commit-rag",
            "--config",
            config_path.to_str().unwrap(),
            "--model",
            "llama3.2",
            "--limit",
            "5",
            "--repo",
            "/tmp/repo",
        ])
        .unwrap();
        let config = cli.resolve_config().await.unwrap();

        assert_eq!(
            config.embedding.vectors_path,
            Some(PathBuf::from("from-file.txt"))
        );
        assert_eq!(config.generation.model, "llama3.2");
        assert_eq!(config.retrieval.limit, 5);
        assert_eq!(config.commands.working_dir, Some(PathBuf::from("/tmp/repo")));
    }

    #[tokio::test]
    async fn test_missing_vectors_is_an_error() {
        let cli = Cli::try_parse_from(["commit-rag"]).unwrap();
        assert!(cli.resolve_config().await.is_err());
    }

    #[tokio::test]
    async fn test_run_fails_on_missing_vectors_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("glove.txt");
        let cli = Cli::try_parse_from(["commit-rag", "--vectors", missing.to_str().unwrap()])
            .unwrap();

        let err = run(cli).await.unwrap_err();
        assert!(format!("{err:#}").contains("unavailable"));
    }
}
