//! Typed error enum for the storage layer.
//!
//! Lets callers match on specific failure modes (not found, duplicate,
//! transient transport errors) instead of downcasting opaque boxes.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Row not found for expected-present entity.
    #[error("not found: {entity} {key}")]
    NotFound { entity: &'static str, key: String },

    /// Unique constraint violation (institution name collision).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// SQL / connection / pool failure.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Transport failure talking to a REST store.
    #[cfg(feature = "rest")]
    #[error("store request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// REST store answered with a non-success status.
    #[error("store returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Row data could not be converted to or from the domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying on a later run).
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::Database(e) => matches!(e, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)),
            #[cfg(feature = "rest")]
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Status { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Whether this error is a unique-constraint violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    pub(crate) fn corrupt(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataCorruption { context: context.into(), source: Box::new(source) }
    }
}

/// Custom `From<sqlx::Error>`, not blanket `#[from]`.
///
/// - `RowNotFound` → `NotFound` (generic; callers remap with entity context)
/// - SQLSTATE 23505 → `Duplicate`
/// - Everything else → `Database`
#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound { entity: "row", key: "unknown".into() },
            sqlx::Error::Database(db_err) if db_err.code().is_some_and(|c| c == "23505") => {
                Self::Duplicate(db_err.message().to_owned())
            },
            _ => Self::Database(err),
        }
    }
}

#[cfg(feature = "rest")]
impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::corrupt("JSON serialization/deserialization", err)
    }
}
