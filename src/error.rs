//! Resolution error types.
//!
//! Every parse failure is fatal for the entry being parsed: no partial
//! descriptor or pattern is ever returned. Overlay application is total and
//! has no error path of its own.

use thiserror::Error;

/// Errors that can occur while parsing descriptors, credential patterns or
/// building sets from configuration sources.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The connection string is not a valid URL shape (bad syntax, missing
    /// scheme or authority, composite-scheme normalization failed).
    #[error("malformed connection string '{url}': {message}")]
    MalformedUrl {
        /// The offending connection string.
        url: String,
        /// What went wrong.
        message: String,
    },

    /// The scheme matches no registry entry and no valid `.type` override
    /// was given, or `.type` names an unknown platform.
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    /// The user-info part of a connection string is not well-formed
    /// `user:pass` (or `token-TYPE:secret`).
    #[error("malformed credentials: {0}")]
    MalformedCredentials(String),

    /// Malformed JSON in an `.options` value, a multi-URL config entry or a
    /// credential-pattern array.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error from the secret directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConnectionError {
    /// Shorthand for a [`ConnectionError::MalformedUrl`].
    pub(crate) fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectionError::MalformedUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}
