//! Error types and handling for `nozbe_org`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Wraps foreign errors with a context message
//! - Provides recovery hints for user-facing errors
//!
//! Only fatal conditions are errors. Recoverable content problems (unsupported
//! comment types, file comments without uploads, uploads pointing at unknown
//! comments) are logged with `tracing::warn!` and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `nozbe_org` operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    // === Data model errors ===
    /// A task references a project id that was never loaded.
    #[error("Task {task_id} references unknown project {project_id}")]
    UnknownProject { task_id: String, project_id: String },

    /// A project selected by name does not exist in the export.
    #[error("Project not found: {name}")]
    ProjectNotFound { name: String },

    /// A task carries a scheduled datetime that cannot be parsed.
    #[error("Invalid datetime '{value}' on task {task_id}: expected YYYY-MM-DD HH:MM:SS")]
    InvalidDatetime { task_id: String, value: String },

    // === Configuration errors ===
    /// Configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    // === Attachment errors ===
    /// The attachment request failed before a response arrived.
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The attachment server answered with a non-success status.
    #[error("Failed to download {url}: HTTP {status}")]
    DownloadStatus { url: String, status: u16 },

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // === I/O errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be written.
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ConvertError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnknownProject { .. } => {
                Some("The export is incomplete: every task must belong to a listed project")
            }
            Self::ProjectNotFound { .. } => Some("Check the project name (matching is exact)"),
            Self::Config(_) => Some(
                "Valid values: layout=combined|per-project, state-markers=contexts|always, \
                 deleted-comments=stop|skip",
            ),
            Self::Download { .. } | Self::DownloadStatus { .. } => {
                Some("Re-run with --no-download to convert without fetching attachments")
            }
            Self::Json(_) => Some("Input must be the data.json file of a Nozbe export"),
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap an error with a context message.
    #[must_use]
    pub fn with_context(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Result type using `ConvertError`.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::UnknownProject {
            task_id: "t1".to_string(),
            project_id: "p9".to_string(),
        };
        assert_eq!(err.to_string(), "Task t1 references unknown project p9");
    }

    #[test]
    fn test_download_status_display() {
        let err = ConvertError::DownloadStatus {
            url: "https://files.example/a.png".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Failed to download https://files.example/a.png: HTTP 404"
        );
    }

    #[test]
    fn test_suggestion() {
        let err = ConvertError::DownloadStatus {
            url: "u".to_string(),
            status: 500,
        };
        assert!(err.suggestion().unwrap().contains("--no-download"));

        let err = ConvertError::Io(std::io::Error::other("x"));
        assert_eq!(err.suggestion(), None);
    }

    #[test]
    fn test_with_context() {
        let err = ConvertError::with_context("reading data.json", std::io::Error::other("gone"));
        assert_eq!(err.to_string(), "reading data.json: gone");
    }
}
