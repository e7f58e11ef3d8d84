use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned identity of a persisted institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstitutionId(pub i64);

impl fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registration source as described in the registry.
///
/// `name` is the natural key used to resolve the persisted identity; the
/// location fields are only written when the institution is first created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub name: String,
    pub subdomain: String,
    #[serde(default)]
    pub filter: Option<String>,
    pub city: String,
    pub zipcode: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Institution {
    /// Value sent as the `url` query parameter: the filter token or empty.
    #[must_use]
    pub fn filter_token(&self) -> &str {
        self.filter.as_deref().unwrap_or("")
    }
}
