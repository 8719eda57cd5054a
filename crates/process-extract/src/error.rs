//! Error types for the extraction engine

use thiserror::Error;

/// Result type alias using ExtractError
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that abort an extraction or a model construction
///
/// Unresolvable flows and missing geometry are not errors; they are
/// reported as [`crate::events::ExtractionEvent`]s and extraction continues.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The requested container does not exist in the model
    #[error("Element not found: {0}")]
    NotFound(String),

    /// The requested element is a flow or label, which cannot own children
    #[error("Element '{0}' is a flow or label and cannot be extracted")]
    NotAContainer(String),

    /// Two elements in the model share an identifier
    #[error("Duplicate element id: {0}")]
    DuplicateElement(String),

    /// The model violates a structural rule
    #[error("Invalid process model: {0}")]
    InvalidModel(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Create a not-found error for an element id
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create an invalid-model error with a message
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }
}

/// Errors reported by an auto-layout service
///
/// These never fail an extraction: the orchestrator logs them and keeps
/// the document it built before calling the service.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Layout service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Layout service timed out after {0} ms")]
    Timeout(u64),

    #[error("Invalid layout response: {0}")]
    InvalidResponse(String),

    #[error("Layout service unavailable: {0}")]
    Unavailable(String),
}
