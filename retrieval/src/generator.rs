//! Prompt assembly and text generation.
//!
//! The [`ResponseGenerator`] retrieves context for a query, renders it into
//! a [`PromptTemplate`] and hands the prompt to a [`GenerationClient`]. The
//! bundled client talks to a local Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GenerationError, Result, RetrievalError};
use crate::retriever::{DEFAULT_SEARCH_LIMIT, Retriever};

/// Default base URL of the local generation service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model requested from the generation service.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default prompt, asking for a commit message.
pub const DEFAULT_TEMPLATE: &str = "You are an assistant that writes git commit messages.\n\
Use the following context from the repository to answer.\n\n\
Context: {context}\n\n\
Question: {query}\n\n\
Reply with a concise commit message only.";

/// Trait for text-generation backends.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Get the name of this client.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}

/// Request body for `POST /api/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model to run.
    pub model: String,

    /// Full prompt text.
    pub prompt: String,

    /// Always `false`: one JSON object per response.
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    /// HTTP client.
    client: reqwest::Client,

    /// API base URL.
    base_url: String,

    /// Model to request.
    model: String,

    /// Per-request timeout.
    timeout: Duration,
}

impl OllamaClient {
    /// Create a client with default endpoint, model and timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    fn map_transport(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        debug!("Requesting generation with model: {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        info!("Generated {} characters", parsed.response.len());
        Ok(parsed.response)
    }
}

/// Prompt text with `{context}` and `{query}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a template from text.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute the placeholders verbatim, in one pass.
    ///
    /// Placeholder text that appears inside `context` or `query` is left as
    /// is. No escaping is applied.
    pub fn render(&self, context: &str, query: &str) -> String {
        const CONTEXT: &str = "{context}";
        const QUERY: &str = "{query}";

        let mut out = String::with_capacity(self.template.len() + context.len() + query.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix(CONTEXT) {
                out.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(QUERY) {
                out.push_str(query);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

/// Retrieves context for a query and asks a [`GenerationClient`] to answer.
pub struct ResponseGenerator {
    client: Box<dyn GenerationClient>,
    template: PromptTemplate,
    limit: usize,
}

impl ResponseGenerator {
    /// Create a generator with the default template and context size.
    pub fn new(client: Box<dyn GenerationClient>) -> Self {
        Self {
            client,
            template: PromptTemplate::default(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Set the prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Set how many documents go into the context.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Build the prompt for `query` from the best matching documents.
    pub fn build_prompt(&self, retriever: &Retriever<'_>, query: &str) -> Result<String> {
        let documents = retriever.search(query, self.limit)?;
        let context = documents
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        debug!(
            "Built prompt from {} documents ({} context characters)",
            documents.len(),
            context.len()
        );
        Ok(self.template.render(&context, query))
    }

    /// Generate an answer, reporting why it failed if it did.
    pub async fn try_generate(&self, retriever: &Retriever<'_>, query: &str) -> Result<String> {
        let prompt = self.build_prompt(retriever, query)?;
        self.client
            .complete(&prompt)
            .await
            .map_err(RetrievalError::from)
    }

    /// Generate an answer, or an empty string if anything fails.
    ///
    /// Failures are logged; use [`ResponseGenerator::try_generate`] to
    /// tell an empty answer from a failed call.
    pub async fn generate(&self, retriever: &Retriever<'_>, query: &str) -> String {
        match self.try_generate(retriever, query).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Generation via {} failed: {e}", self.client.name());
                String::new()
            }
        }
    }
}
