//! Institution registry: declarative list of upstream sources.
//!
//! A default registry is compiled into the binary; an external JSON file with
//! the same shape replaces it without recompiling.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COURSE_CODE, DEFAULT_ORIGIN_TEMPLATE, DEFAULT_SEATS_TOTAL, LOAD_COURSES_PATH,
    MAX_SEAT_COUNT, SUBDOMAIN_PLACEHOLDER,
};
use crate::error::RegistryError;
use crate::institution::Institution;
use crate::normalize::RowContext;

const BUNDLED_REGISTRY: &str = include_str!("../registry.json");

fn default_origin_template() -> String {
    DEFAULT_ORIGIN_TEMPLATE.to_owned()
}

fn default_course_code() -> String {
    DEFAULT_COURSE_CODE.to_owned()
}

const fn default_seats_total() -> u32 {
    DEFAULT_SEATS_TOTAL
}

/// Settings shared by every institution hosted on the same provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default = "default_origin_template")]
    pub origin_template: String,
    #[serde(default = "default_course_code")]
    pub course_code: String,
    #[serde(default = "default_seats_total")]
    pub seats_total: u32,
}

impl Default for Provider {
    fn default() -> Self {
        Self {
            origin_template: default_origin_template(),
            course_code: default_course_code(),
            seats_total: default_seats_total(),
        }
    }
}

impl Provider {
    /// Base origin of an institution, without a trailing slash.
    #[must_use]
    pub fn origin(&self, institution: &Institution) -> String {
        self.origin_template
            .replace(SUBDOMAIN_PLACEHOLDER, &institution.subdomain)
            .trim_end_matches('/')
            .to_owned()
    }

    /// Full URL of the course listing endpoint for an institution.
    #[must_use]
    pub fn endpoint(&self, institution: &Institution) -> String {
        format!("{}{LOAD_COURSES_PATH}", self.origin(institution))
    }

    /// Fixed values the normalizer stamps on every course of `institution`.
    #[must_use]
    pub fn row_context(&self, institution: &Institution) -> RowContext {
        RowContext {
            origin: self.origin(institution),
            course_code: self.course_code.clone(),
            seats_total: self.seats_total,
        }
    }
}

/// Ordered set of institutions to sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub provider: Provider,
    pub institutions: Vec<Institution>,
}

impl Registry {
    /// The registry compiled into the binary.
    ///
    /// # Errors
    /// Only if the bundled document is malformed.
    pub fn bundled() -> Result<Self, RegistryError> {
        Self::from_json_str(BUNDLED_REGISTRY)
    }

    /// Parse and validate a registry document.
    ///
    /// # Errors
    /// Returns [`RegistryError::Json`] for malformed JSON and
    /// [`RegistryError::Invalid`] when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let registry: Self = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Load a registry document from disk.
    ///
    /// # Errors
    /// Returns [`RegistryError::Io`] if the file cannot be read, otherwise as
    /// [`Registry::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            institutions = registry.institutions.len(),
            "loaded registry"
        );
        Ok(registry)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.institutions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let template = &self.provider.origin_template;
        if !template.starts_with("http://") && !template.starts_with("https://") {
            return Err(RegistryError::Invalid(format!(
                "origin_template must be an absolute http(s) URL, got {template:?}"
            )));
        }
        if self.provider.seats_total > MAX_SEAT_COUNT {
            return Err(RegistryError::Invalid(format!(
                "seats_total {} exceeds the maximum of {MAX_SEAT_COUNT}",
                self.provider.seats_total
            )));
        }

        let mut seen = HashSet::with_capacity(self.institutions.len());
        for (index, institution) in self.institutions.iter().enumerate() {
            if institution.name.trim().is_empty() {
                return Err(RegistryError::Invalid(format!(
                    "institution #{index} has an empty name"
                )));
            }
            if institution.subdomain.trim().is_empty() {
                return Err(RegistryError::Invalid(format!(
                    "institution {:?} has an empty subdomain",
                    institution.name
                )));
            }
            if !seen.insert(institution.name.as_str()) {
                return Err(RegistryError::Invalid(format!(
                    "institution {:?} is listed more than once",
                    institution.name
                )));
            }
        }
        Ok(())
    }
}
