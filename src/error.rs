//! Error types

use thiserror::Error;

/// Failures reported by a [`Dom`](crate::dom::Dom) implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// A call into the browser DOM threw
    #[error("DOM call failed: {0}")]
    Js(String),

    /// An HTML fragment could not be parsed
    #[error("malformed markup: {0}")]
    Markup(String),

    /// A node handle no longer refers to a live node
    #[error("node is not part of the document")]
    MissingNode,
}

/// Editor-level errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// The deferred text source failed. Displays exactly the source's message.
    #[error("{0}")]
    TextSource(String),

    /// A toolbar control named a format that is not bold, italic or underline
    #[error("unknown format type: {0}")]
    UnknownFormat(String),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid editor config: {0}")]
    Config(#[from] serde_json::Error),
}

impl EditorError {
    /// The message carried by a text source failure, if this is one
    pub fn source_message(&self) -> Option<&str> {
        match self {
            EditorError::TextSource(message) => Some(message),
            _ => None,
        }
    }
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
