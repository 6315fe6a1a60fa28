//! Error types for fintrack-core
//!
//! This module provides the user-facing error taxonomy surfaced through the
//! snapshot, with error codes, severities and suggestions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Form input rejected locally
    ValidationError,
    /// Store unreachable or failing with 5xx
    Connectivity,
    /// Every collection failed to load
    AllUnavailable,
    /// Some collections failed to load
    PartialFailure,
    /// Mutation target missing on the store
    NotFound,
    /// Response body not of the expected structure
    InvalidShape,
    /// Record still carries a provisional identifier
    UnsavedRecord,
    /// Identifier not in store format
    InvalidId,
    /// Other non-success response to a mutation
    RequestFailed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::Connectivity => write!(f, "CONNECTIVITY"),
            ErrorCode::AllUnavailable => write!(f, "ALL_UNAVAILABLE"),
            ErrorCode::PartialFailure => write!(f, "PARTIAL_FAILURE"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::InvalidShape => write!(f, "INVALID_SHAPE"),
            ErrorCode::UnsavedRecord => write!(f, "UNSAVED_RECORD"),
            ErrorCode::InvalidId => write!(f, "INVALID_ID"),
            ErrorCode::RequestFailed => write!(f, "REQUEST_FAILED"),
        }
    }
}

/// Detailed error information for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation rejected, nothing changed
    Warning,
    /// Error - operation failed and was rolled back
    Error,
    /// Critical - no data could be loaded
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for fintrack-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internet connection appears to be down. Please check your connection and try again.")]
    Connectivity,

    #[error("All services are currently unavailable. Please try again later.")]
    AllUnavailable,

    #[error("Failed to load {}. Some data may be unavailable.", .resources.join(", "))]
    PartialFailure { resources: Vec<String> },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Invalid {resource} data received from server")]
    InvalidShape { resource: String },

    #[error("Cannot {action} a transaction that hasn't been saved yet. Please save the transaction first.")]
    UnsavedRecord { action: String },

    #[error("Invalid transaction ID format. Please refresh the page and try again.")]
    InvalidId,

    #[error("{message}")]
    RequestFailed { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::Connectivity => ErrorCode::Connectivity,
            CoreError::AllUnavailable => ErrorCode::AllUnavailable,
            CoreError::PartialFailure { .. } => ErrorCode::PartialFailure,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InvalidShape { .. } => ErrorCode::InvalidShape,
            CoreError::UnsavedRecord { .. } => ErrorCode::UnsavedRecord,
            CoreError::InvalidId => ErrorCode::InvalidId,
            CoreError::RequestFailed { .. } => ErrorCode::RequestFailed,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Validation { .. } => ErrorSeverity::Info,
            CoreError::UnsavedRecord { .. } => ErrorSeverity::Warning,
            CoreError::InvalidId => ErrorSeverity::Warning,
            CoreError::NotFound { .. } => ErrorSeverity::Warning,
            CoreError::PartialFailure { .. } => ErrorSeverity::Error,
            CoreError::InvalidShape { .. } => ErrorSeverity::Error,
            CoreError::RequestFailed { .. } => ErrorSeverity::Error,
            CoreError::Connectivity => ErrorSeverity::Critical,
            CoreError::AllUnavailable => ErrorSeverity::Critical,
        }
    }

    /// Whether a fresh fetch-all is the suggested recovery
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Connectivity
                | CoreError::AllUnavailable
                | CoreError::PartialFailure { .. }
                | CoreError::InvalidShape { .. }
        )
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::PartialFailure { resources } => {
                details = details.with_detail(serde_json::json!({ "failed": resources }));
                details = details.with_suggestion("Retry to reload every collection.".to_string());
            }
            CoreError::Connectivity | CoreError::AllUnavailable => {
                details = details.with_suggestion(
                    "Check that the store at remote.base_url is reachable.".to_string(),
                );
                details = details.with_suggestion("Retry to reload every collection.".to_string());
            }
            CoreError::InvalidShape { resource } => {
                details = details.with_detail(serde_json::json!({ "resource": resource }));
            }
            CoreError::UnsavedRecord { .. } => {
                details = details.with_suggestion(
                    "Wait for the pending save to finish before editing.".to_string(),
                );
            }
            CoreError::NotFound { .. } => {
                details = details.with_suggestion(
                    "The record may have been removed elsewhere; reload the list.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Record involved, if any
    pub record_id: Option<String>,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            record_id: None,
            data: serde_json::json!({}),
        }
    }

    /// Add the record identifier
    pub fn with_record(mut self, record_id: &str) -> Self {
        self.record_id = Some(record_id.to_string());
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "fintrack::error",
            "ERROR [{}] {} - Operation: {} - Record: {:?} - Data: {}",
            error.code(),
            error,
            context.operation,
            context.record_id,
            context.data
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "fintrack::error",
            "WARNING: {} - Operation: {} - Record: {:?}",
            message,
            context.operation,
            context.record_id
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::Connectivity.to_string(), "CONNECTIVITY");
        assert_eq!(ErrorCode::PartialFailure.to_string(), "PARTIAL_FAILURE");
        assert_eq!(ErrorCode::UnsavedRecord.to_string(), "UNSAVED_RECORD");
    }

    #[test]
    fn test_partial_failure_message_names_resources() {
        let error = CoreError::PartialFailure {
            resources: vec!["transactions".to_string(), "categories".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Failed to load transactions, categories. Some data may be unavailable."
        );
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert!(error.is_retryable());
    }

    #[test]
    fn test_shape_message() {
        let error = CoreError::InvalidShape {
            resource: "budgets".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid budgets data received from server");
        assert!(error.to_details().details.is_some());
    }

    #[test]
    fn test_core_error_severity() {
        assert_eq!(CoreError::Connectivity.severity(), ErrorSeverity::Critical);
        let unsaved = CoreError::UnsavedRecord {
            action: "edit".to_string(),
        };
        assert_eq!(unsaved.severity(), ErrorSeverity::Warning);
        assert_eq!(
            unsaved.to_string(),
            "Cannot edit a transaction that hasn't been saved yet. Please save the transaction first."
        );
        assert!(!CoreError::InvalidId.is_retryable());
    }

    #[test]
    fn test_error_details_display() {
        let rendered = CoreError::AllUnavailable.to_details().to_string();
        assert!(rendered.starts_with("[ALL_UNAVAILABLE] All services are currently unavailable."));
        assert!(rendered.contains("Suggestions:"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("delete_transaction")
            .with_record("65a1f0c2b3d4e5f6a7b8c9d0")
            .with_data("status", serde_json::json!(404));

        assert_eq!(context.operation, "delete_transaction");
        assert_eq!(context.record_id.as_deref(), Some("65a1f0c2b3d4e5f6a7b8c9d0"));
        assert_eq!(context.data["status"], 404);
    }
}
