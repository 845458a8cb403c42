//! Error types for merge operations
//!
//! Unbound tokens are not errors: a token with no binding is left in the document verbatim.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MergeError>;

#[derive(Debug, Error)]
pub enum MergeError {
    /// A binding value of a kind the renderer cannot produce content for
    #[error("Element of kind {kind} is not valid for substitution")]
    UnsupportedValueKind { kind: String },

    /// Composite fill found no row to use as a template
    #[error("Table has no template row to clone")]
    MissingTemplateRow,

    #[error("Token '{token}' cannot be searched for: {message}")]
    InvalidToken { token: String, message: String },

    #[error("Style '{0}' is not defined in the style catalog")]
    StyleNotFound(String),

    /// A token kept matching after the configured number of replacements
    #[error("Token '{token}' still matched after {limit} replacements in one paragraph")]
    ReplacementLimit { token: String, limit: usize },

    #[error("Fragment markup could not be processed: {0}")]
    Fragment(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
