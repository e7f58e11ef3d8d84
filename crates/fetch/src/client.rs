use std::time::Duration;

use coursesync_core::{
    DEFAULT_HTTP_TIMEOUT_SECS, Institution, PAGE_LENGTH, Provider, RawRow, env_parse_with_default,
};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::error::FetchError;

/// Default `User-Agent` sent upstream.
pub const DEFAULT_USER_AGENT: &str =
    concat!("coursesync/", env!("CARGO_PKG_VERSION"), " (course availability sync)");

const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
const ACCEPT_ENGLISH: &str = "en-US,en;q=0.9";
const BODY_SNIPPET_LEN: usize = 200;

/// Request settings for [`CourseFeedClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl FetchSettings {
    /// Reads `COURSESYNC_HTTP_TIMEOUT_SECS` and `COURSESYNC_USER_AGENT`.
    #[must_use]
    pub fn from_env() -> Self {
        let secs = env_parse_with_default("COURSESYNC_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS);
        let user_agent = std::env::var("COURSESYNC_USER_AGENT")
            .ok()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());
        Self { timeout: Duration::from_secs(secs.max(1)), user_agent }
    }
}

#[derive(Deserialize)]
struct LoadCoursesResponse {
    #[serde(default)]
    data: Option<Vec<RawRow>>,
}

/// Client for the upstream `loadcourses` endpoint.
#[derive(Debug, Clone)]
pub struct CourseFeedClient {
    client: reqwest::Client,
}

impl CourseFeedClient {
    /// Builds a client with a bounded per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure
    /// or an invalid user agent).
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_ENGLISH));

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::ClientInit(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch the first page of course rows for `institution` hosted on `provider`.
    ///
    /// A body without a `data` field is a valid empty listing.
    ///
    /// # Errors
    /// [`FetchError::Timeout`] when the request exceeds the timeout,
    /// [`FetchError::HttpStatus`] for non-2xx responses, and
    /// [`FetchError::Decode`] when the body is not the expected JSON object.
    pub async fn fetch(
        &self,
        provider: &Provider,
        institution: &Institution,
    ) -> Result<Vec<RawRow>, FetchError> {
        let url = provider.endpoint(institution);
        let length = PAGE_LENGTH.to_string();
        tracing::debug!(institution = %institution.name, %url, "fetching course listing");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("start", "0"),
                ("length", length.as_str()),
                ("url", institution.filter_token()),
                ("layout_type", "public"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: LoadCoursesResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                snippet: truncate(&body, BODY_SNIPPET_LEN).to_owned(),
                source,
            })?;

        let rows = parsed.data.unwrap_or_default();
        tracing::debug!(institution = %institution.name, rows = rows.len(), "fetched course listing");
        Ok(rows)
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
