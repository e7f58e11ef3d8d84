//! Storage layer for coursesync
//!
//! The sync engine talks to a store only through [`InstitutionStore`] and
//! [`CourseStore`]. Backends: PostgreSQL (sqlx, transactional replace),
//! PostgREST (reqwest) and an in-memory store for dry runs and tests.

mod backend;
pub mod error;
mod memory;
#[cfg(feature = "postgres")]
mod pg_storage;
#[cfg(feature = "rest")]
mod rest_storage;
pub mod traits;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::MemoryStorage;
#[cfg(feature = "postgres")]
pub use pg_storage::PgStorage;
#[cfg(feature = "rest")]
pub use rest_storage::RestStorage;
pub use traits::{CourseStore, InstitutionStore, SyncStore};
