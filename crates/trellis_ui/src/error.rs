//! # UI Error Types
//!
//! Errors surfaced to the host. Anything that can go wrong while a tick is
//! running (unresolved references, unknown widget types) is logged instead.

use thiserror::Error;

/// Errors that can occur while loading or editing a scene.
#[derive(Error, Debug)]
pub enum UiError {
    /// JSON node source could not be decoded.
    #[error("malformed JSON source: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML node source or configuration could not be decoded.
    #[error("malformed TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A geometry expression does not follow the grammar.
    #[error("invalid expression {text:?}: {reason}")]
    Expression {
        /// The offending expression text.
        text: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The template loader reported a failure.
    #[error("template {name:?} failed to load: {reason}")]
    Template {
        /// Template name as written in the node's `source`.
        name: String,
        /// Loader-provided reason.
        reason: String,
    },

    /// A template was requested but no loader is installed.
    #[error("no template loader set")]
    NoTemplateLoader,

    /// A node handle no longer refers to a live node.
    #[error("node not found: {0:?}")]
    NodeNotFound(crate::widget::NodeId),
}

impl UiError {
    /// Builds an expression error.
    pub(crate) fn expression(text: &str, reason: impl Into<String>) -> Self {
        Self::Expression {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;
