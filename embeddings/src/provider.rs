//! Word-vector providers.
//!
//! A provider maps a single token to its pretrained vector. The
//! [`WordVectorTable`] reads the plain-text format shared by GloVe and
//! word2vec (`token v1 v2 ... vN`, one entry per line).

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Trait for word-vector providers.
pub trait WordVectorProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the native dimension of the vectors.
    fn dimension(&self) -> usize;

    /// Look up the vector for a single token.
    fn lookup(&self, token: &str) -> Option<Embedding>;

    /// Check if the provider has any vectors to offer.
    fn is_available(&self) -> bool;
}

/// In-memory word-vector table.
#[derive(Debug, Clone, Default)]
pub struct WordVectorTable {
    /// Name reported by [`WordVectorProvider::name`].
    name: String,

    /// Token to vector.
    vectors: HashMap<String, Embedding>,

    /// Dimension shared by every vector, 0 while empty.
    dimension: usize,
}

impl WordVectorTable {
    /// Build a table from `(token, vector)` pairs.
    ///
    /// The first vector fixes the dimension. A later token repeats
    /// overwrite earlier ones.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Embedding)>,
        S: Into<String>,
    {
        let mut table = Self {
            name: "in-memory".to_string(),
            ..Self::default()
        };
        for (token, vector) in entries {
            table.insert(token.into(), vector)?;
        }
        Ok(table)
    }

    /// Parse a GloVe / word2vec text table.
    ///
    /// Blank lines are skipped, as is a leading word2vec header made of
    /// exactly two integers (`count dim`).
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = Self {
            name: "word-vectors".to_string(),
            ..Self::default()
        };

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let mut fields = line.split_whitespace();
            let Some(token) = fields.next() else {
                continue;
            };
            let values: Vec<&str> = fields.collect();

            if table.vectors.is_empty() && is_word2vec_header(token, &values) {
                debug!("Skipping word2vec header on line {line_no}");
                continue;
            }
            if values.is_empty() {
                return Err(EmbeddingError::Parse {
                    line: line_no,
                    message: format!("token {token:?} has no vector"),
                });
            }

            let vector = values
                .iter()
                .map(|v| v.parse::<f64>())
                .collect::<std::result::Result<Embedding, _>>()
                .map_err(|e| EmbeddingError::Parse {
                    line: line_no,
                    message: format!("invalid number for token {token:?}: {e}"),
                })?;

            table
                .insert(token.to_string(), vector)
                .map_err(|e| EmbeddingError::Parse {
                    line: line_no,
                    message: e.to_string(),
                })?;
        }

        Ok(table)
    }

    /// Load a word-vector table from disk.
    ///
    /// A missing file or one without any vectors is reported as
    /// [`EmbeddingError::ProviderUnavailable`].
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |reason: String| EmbeddingError::ProviderUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let mut table = Self::parse(&text)?;
        if table.vectors.is_empty() {
            return Err(unavailable("no word vectors found".to_string()));
        }
        table.name = path.display().to_string();

        info!(
            "Loaded {} word vectors ({} dimensions) from {}",
            table.len(),
            table.dimension,
            path.display()
        );
        Ok(table)
    }

    /// Set the provider name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the number of tokens in the table.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn insert(&mut self, token: String, vector: Embedding) -> Result<()> {
        if self.vectors.is_empty() {
            self.dimension = vector.len();
        } else if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.insert(token, vector);
        Ok(())
    }
}

fn is_word2vec_header(first: &str, rest: &[&str]) -> bool {
    rest.len() == 1 && first.parse::<usize>().is_ok() && rest[0].parse::<usize>().is_ok()
}

impl WordVectorProvider for WordVectorTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn lookup(&self, token: &str) -> Option<Embedding> {
        self.vectors.get(token).cloned()
    }

    fn is_available(&self) -> bool {
        !self.vectors.is_empty() && self.dimension > 0
    }
}
