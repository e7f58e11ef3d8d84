//! Core types for coursesync
//!
//! Domain types shared across all other crates, the institution registry,
//! and the pure row normalizer.

mod constants;
mod course;
mod env_config;
mod error;
mod institution;
pub mod markup;
mod normalize;
mod registry;

pub use constants::*;
pub use course::*;
pub use env_config::*;
pub use error::{ParseError, RegistryError};
pub use institution::*;
pub use normalize::*;
pub use registry::*;
