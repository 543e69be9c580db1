//! Error types for profile fetching, storage, and import/export
//!
//! Errors are classified by how a batch should react:
//! - PerItem: provider failures and malformed responses (continue the batch)
//! - RequiresUserAction: missing credential, bad CSV header
//! - Fatal to the command: storage and edit failures

use thiserror::Error;

/// How many characters of an unparseable AI answer are kept for diagnosis.
pub const RESPONSE_EXCERPT_CHARS: usize = 500;

/// Error types for the profiler
#[derive(Debug, Error)]
pub enum ProfilerError {
    // Detected locally before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Per-item errors
    #[error("AI API Error: {0}")]
    Provider(String),

    #[error("Failed to parse AI response. Raw response: {excerpt}...")]
    MalformedResponse { excerpt: String },

    // Aborts an import before any fetch
    #[error("CSV import error: {0}")]
    ImportFormat(String),

    #[error("Company not found: {0}")]
    NotFound(String),

    #[error("Edit error: {0}")]
    Edit(String),

    #[error("{0}")]
    NoData(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ProfilerError {
    /// Build a `MalformedResponse` keeping only the head of the offending text.
    pub fn malformed(text: &str) -> Self {
        ProfilerError::MalformedResponse {
            excerpt: text.chars().take(RESPONSE_EXCERPT_CHARS).collect(),
        }
    }

    /// Returns true if a batch loop should record this error and move on
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            ProfilerError::Provider(_) | ProfilerError::MalformedResponse { .. }
        )
    }

    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            ProfilerError::Configuration(_) | ProfilerError::ImportFormat(_)
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ProfilerError::Configuration(_) => {
                "Set GEMINI_API_KEY (or apiKey in ~/.csr-profiler/config.json) and try again."
            }
            ProfilerError::Provider(_) => "Check your internet connection and try again.",
            ProfilerError::MalformedResponse { .. } => {
                "The AI answer was not valid JSON. Refresh the company to try again."
            }
            ProfilerError::ImportFormat(_) => {
                "Check the CSV header row contains the company name column."
            }
            ProfilerError::NotFound(_) => "Run `csr-profiler list` to see stored company ids.",
            ProfilerError::Edit(_) => "Check the field path and value type.",
            ProfilerError::NoData(_) => "Search for or import companies first.",
            ProfilerError::Storage(_) => "Check the storage directory is readable and writable.",
            ProfilerError::Io(_) => "Check file permissions and disk space.",
        }
    }
}

impl From<std::io::Error> for ProfilerError {
    fn from(err: std::io::Error) -> Self {
        ProfilerError::Io(err.to_string())
    }
}

/// Serializable error representation for command output
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    pub error_type: ErrorType,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    PerItem,
    RequiresUserAction,
    Fatal,
}

impl From<&ProfilerError> for ErrorReport {
    fn from(err: &ProfilerError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else if err.is_per_item() {
            ErrorType::PerItem
        } else {
            ErrorType::Fatal
        };

        ErrorReport {
            message: err.to_string(),
            error_type,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_keeps_excerpt_head() {
        let long = "x".repeat(RESPONSE_EXCERPT_CHARS + 200);
        match ProfilerError::malformed(&long) {
            ProfilerError::MalformedResponse { excerpt } => {
                assert_eq!(excerpt.chars().count(), RESPONSE_EXCERPT_CHARS);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classification() {
        assert!(ProfilerError::Provider("boom".into()).is_per_item());
        assert!(ProfilerError::malformed("nope").is_per_item());
        assert!(!ProfilerError::Configuration("no key".into()).is_per_item());
        assert!(ProfilerError::ImportFormat("header".into()).requires_user_action());
    }

    #[test]
    fn test_error_report_type() {
        let report = ErrorReport::from(&ProfilerError::Storage("disk".into()));
        assert_eq!(report.error_type, ErrorType::Fatal);
        assert!(report.message.contains("disk"));

        let report = ErrorReport::from(&ProfilerError::Configuration("no key".into()));
        assert_eq!(report.error_type, ErrorType::RequiresUserAction);
    }
}
