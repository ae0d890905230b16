//! Ingestion sources: files and shell command output.
//!
//! These produce [`Document`]s for the store. They never touch the store
//! themselves, so a failed read or command simply yields an error.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{Result, RetrievalError};

/// Default time a command may run.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Read a file into a document whose id is the path.
pub async fn load_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RetrievalError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Read {} bytes from {}", content.len(), path.display());
    Ok(Document::new(path.display().to_string(), content))
}

/// A shell command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command line passed to `sh -c`.
    pub command: String,

    /// Working directory.
    pub working_dir: Option<PathBuf>,

    /// Maximum execution time.
    pub timeout: Duration,
}

impl CommandSpec {
    /// Create a command with the default timeout and current directory.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Set the working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Captured result of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// The command that ran.
    pub command: String,

    /// Stdout followed by stderr; `None` when both were empty.
    pub output: Option<String>,

    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,

    /// Execution time in milliseconds.
    pub duration_ms: u64,
}

impl CommandOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn the output into a document keyed by the command.
    ///
    /// Returns `None` when the command printed nothing.
    pub fn into_document(self) -> Option<Document> {
        let command = self.command;
        self.output.map(|output| Document::new(command, output))
    }
}

/// Run a command through `sh -c` and capture its combined output.
///
/// A non-zero exit is not an error: its output is still returned. Failing
/// to spawn, or exceeding the timeout, is.
pub async fn run_command(spec: &CommandSpec) -> Result<CommandOutput> {
    let start = Instant::now();
    let command_error = |reason: String| RetrievalError::Command {
        command: spec.command.clone(),
        reason,
    };

    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(&spec.command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.working_dir {
        command.current_dir(dir);
    }

    debug!("Running command: {}", spec.command);

    let child = command.spawn().map_err(|e| command_error(e.to_string()))?;
    let output = tokio::time::timeout(spec.timeout, child.wait_with_output())
        .await
        .map_err(|_| command_error(format!("timed out after {:?}", spec.timeout)))?
        .map_err(|e| command_error(e.to_string()))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Command `{}` exited with {:?} in {duration_ms}ms",
        spec.command,
        output.status.code()
    );

    Ok(CommandOutput {
        command: spec.command.clone(),
        output: (!text.is_empty()).then_some(text),
        exit_code: output.status.code(),
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, "the cat sat").await.unwrap();

        let doc = load_file(&path).await.unwrap();
        assert_eq!(doc.id, path.display().to_string());
        assert_eq!(doc.content, "the cat sat");
        assert_eq!(doc.embedding(), None);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path().join("missing.txt")).await.unwrap_err();
        assert!(matches!(err, RetrievalError::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_run_command_captures_output() {
        let output = run_command(&CommandSpec::new("echo hello")).await.unwrap();

        assert!(output.success());
        assert_eq!(output.output.as_deref(), Some("hello\n"));

        let doc = output.into_document().unwrap();
        assert_eq!(doc.id, "echo hello");
        assert_eq!(doc.content, "hello\n");
    }

    #[tokio::test]
    async fn test_run_command_combines_stderr() {
        let spec = CommandSpec::new("echo out; echo err 1>&2; exit 3");
        let output = run_command(&spec).await.unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.output.as_deref(), Some("out\nerr\n"));
    }

    #[tokio::test]
    async fn test_run_command_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("marker.txt"), "")
            .await
            .unwrap();

        let spec = CommandSpec::new("ls").with_working_dir(dir.path());
        let output = run_command(&spec).await.unwrap();
        assert_eq!(output.output.as_deref(), Some("marker.txt\n"));
    }

    #[tokio::test]
    async fn test_run_command_silent_has_no_document() {
        let output = run_command(&CommandSpec::new("true")).await.unwrap();
        assert_eq!(output.output, None);
        assert!(output.into_document().is_none());
    }

    #[tokio::test]
    async fn test_run_command_timeout() {
        let spec = CommandSpec::new("sleep 5").with_timeout(Duration::from_millis(100));
        let err = run_command(&spec).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Command { .. }));
    }

    #[tokio::test]
    async fn test_run_command_missing_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("true").with_working_dir(dir.path().join("nope"));
        let err = run_command(&spec).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Command { .. }));
    }
}
