//! Typed error enum for the service layer.
//!
//! Lets the orchestrator tell an identity failure apart from a failed course
//! write without inspecting messages.

use std::time::Duration;

use coursesync_storage::StorageError;
use thiserror::Error;

/// Failure of one institution's sync. Row-level parse failures never surface here.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The institution could not be looked up or created. No courses were written.
    #[error("could not resolve institution {name}: {source}")]
    IdentityResolution {
        name: String,
        #[source]
        source: StorageError,
    },

    /// Replacing the course set failed.
    #[error("storing courses for {name}: {source}")]
    Store {
        name: String,
        #[source]
        source: StorageError,
    },

    /// A store call did not finish within the store timeout.
    #[error("{operation} for {name} timed out after {after:?}")]
    Timeout { name: String, operation: &'static str, after: Duration },
}

impl SyncError {
    /// Whether this error is likely transient (worth retrying on a later run).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::IdentityResolution { source, .. } | Self::Store { source, .. } => {
                source.is_transient()
            },
            Self::Timeout { .. } => true,
        }
    }

    /// Name of the institution the failure belongs to.
    pub fn institution(&self) -> &str {
        match self {
            Self::IdentityResolution { name, .. }
            | Self::Store { name, .. }
            | Self::Timeout { name, .. } => name,
        }
    }
}
