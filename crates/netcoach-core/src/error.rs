//! Analysis error types.
//!
//! Every computation in this crate is total over validated input; these
//! errors describe input that fails validation or stored data that cannot
//! be decoded. Missing data is never an error: it produces an empty report.

use thiserror::Error;

/// Errors raised by the analysis core.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A count was negative, or counts exceed the total they belong to.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A stored JSON string could not be decoded.
    #[error("failed to parse {context}: {source}")]
    ParseFailure {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AnalysisError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error comes from corrupt stored data rather
    /// than from caller-supplied counts.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, AnalysisError::ParseFailure { .. })
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, AnalysisError>;
