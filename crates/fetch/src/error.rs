//! Typed error enum for the fetch crate.

use thiserror::Error;

/// Errors from a course-listing request. Scoped to one institution.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("invalid response body: {source} (body: {snippet})")]
    Decode {
        snippet: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl FetchError {
    /// Whether a later run is likely to succeed without upstream changes.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Request(_) => true,
            Self::HttpStatus(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::Decode { .. } | Self::ClientInit(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Request(err) }
    }
}
