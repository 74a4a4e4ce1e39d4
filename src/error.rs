// src/error.rs
//! Per-source fetch failures. These never escape the pipeline: the fetcher
//! logs them and the source simply contributes no items.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid feed url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected http status {0}")]
    Http(u16),

    #[error("feed parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Transport-level failures are worth another attempt; a bad URL or a
    /// malformed document will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) => true,
            FetchError::Http(status) => *status >= 500,
            FetchError::InvalidUrl { .. } | FetchError::Parse(_) => false,
        }
    }

    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::Network(_) => "network",
            FetchError::Timeout(_) => "timeout",
            FetchError::Http(_) => "http",
            FetchError::Parse(_) => "parse",
        }
    }
}
