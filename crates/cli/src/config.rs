//! Store selection from the environment.

use std::fmt;

use coursesync_core::env_first;

const URL_VARS: &[&str] = &["STORE_URL", "SUPABASE_URL"];
const KEY_VARS: &[&str] = &["STORE_KEY", "SUPABASE_KEY"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("STORE_URL (or SUPABASE_URL) environment variable must be set")]
    MissingUrl,
    #[error("STORE_KEY (or SUPABASE_KEY) must be set for an HTTP store at {0}")]
    MissingKey(String),
    #[error("unsupported store URL {0:?}: expected postgres://, postgresql://, http:// or https://")]
    UnsupportedScheme(String),
}

/// Which store a run writes to.
#[derive(PartialEq, Eq)]
pub(crate) enum StoreConfig {
    Postgres { url: String },
    Rest { url: String, key: String },
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres { .. } => f.debug_struct("Postgres").field("url", &"[REDACTED]").finish(),
            Self::Rest { url, .. } => {
                f.debug_struct("Rest").field("url", url).field("key", &"[REDACTED]").finish()
            },
        }
    }
}

impl StoreConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(env_first(URL_VARS), env_first(KEY_VARS))
    }

    fn from_values(url: Option<String>, key: Option<String>) -> Result<Self, ConfigError> {
        let url = url.ok_or(ConfigError::MissingUrl)?;
        let lower = url.to_ascii_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Ok(Self::Postgres { url })
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            match key {
                Some(key) => Ok(Self::Rest { url, key }),
                None => Err(ConfigError::MissingKey(url)),
            }
        } else {
            Err(ConfigError::UnsupportedScheme(url))
        }
    }
}
