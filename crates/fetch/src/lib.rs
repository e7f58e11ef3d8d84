//! Fetcher for institution course listings.
//!
//! One bounded GET per institution against the provider's `loadcourses`
//! endpoint. Never touches the store.

mod client;
mod error;

pub use client::{CourseFeedClient, DEFAULT_USER_AGENT, FetchSettings, truncate};
pub use error::FetchError;
