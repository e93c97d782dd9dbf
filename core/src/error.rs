//! Error types for the todo API client.
//!
//! `NotFound` gets its own variant because a 404 on update or delete means
//! the record vanished server-side. Other unexpected statuses land in `Http`
//! with the raw status and body for the log.

use thiserror::Error;

/// Failure of a single remote call, from transport to response parsing.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The round-trip itself failed: connection refused or reset.
    #[error("transport failed: {0}")]
    Transport(String),
}
