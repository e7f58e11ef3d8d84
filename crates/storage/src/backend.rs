//! Unified storage backend with enum dispatch.

#[cfg(feature = "rest")]
use std::time::Duration;

use async_trait::async_trait;
use coursesync_core::{Course, Institution, InstitutionId, NewCourse};

use crate::error::StorageError;
use crate::memory::MemoryStorage;
use crate::traits::{CourseStore, InstitutionStore};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            #[cfg(feature = "postgres")]
            StorageBackend::Postgres(s) => <crate::pg_storage::PgStorage as $trait>::$method(s, $($arg),*).await,
            #[cfg(feature = "rest")]
            StorageBackend::Rest(s) => <crate::rest_storage::RestStorage as $trait>::$method(s, $($arg),*).await,
            StorageBackend::Memory(s) => <MemoryStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Debug)]
pub enum StorageBackend {
    #[cfg(feature = "postgres")]
    Postgres(crate::pg_storage::PgStorage),
    #[cfg(feature = "rest")]
    Rest(crate::rest_storage::RestStorage),
    Memory(MemoryStorage),
}

impl StorageBackend {
    #[cfg(feature = "postgres")]
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(crate::pg_storage::PgStorage::new(database_url).await?))
    }

    #[cfg(feature = "rest")]
    pub fn new_rest(
        project_url: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        Ok(Self::Rest(crate::rest_storage::RestStorage::new(project_url, api_key, timeout)?))
    }

    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(MemoryStorage::new())
    }

    /// Short backend name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => "postgres",
            #[cfg(feature = "rest")]
            Self::Rest(_) => "rest",
            Self::Memory(_) => "memory",
        }
    }
}

// ── InstitutionStore ─────────────────────────────────────────────

#[async_trait]
impl InstitutionStore for StorageBackend {
    async fn find_institution_by_name(
        &self,
        name: &str,
    ) -> Result<Option<InstitutionId>, StorageError> {
        dispatch!(self, InstitutionStore, find_institution_by_name(name))
    }

    async fn insert_institution(
        &self,
        institution: &Institution,
    ) -> Result<InstitutionId, StorageError> {
        dispatch!(self, InstitutionStore, insert_institution(institution))
    }
}

// ── CourseStore ──────────────────────────────────────────────────

#[async_trait]
impl CourseStore for StorageBackend {
    async fn delete_courses_by_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<u64, StorageError> {
        dispatch!(self, CourseStore, delete_courses_by_institution(institution_id))
    }

    async fn insert_course(
        &self,
        institution_id: InstitutionId,
        course: &NewCourse,
    ) -> Result<(), StorageError> {
        dispatch!(self, CourseStore, insert_course(institution_id, course))
    }

    async fn list_courses(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<Course>, StorageError> {
        dispatch!(self, CourseStore, list_courses(institution_id))
    }

    async fn insert_courses(
        &self,
        institution_id: InstitutionId,
        courses: &[NewCourse],
    ) -> Result<usize, StorageError> {
        dispatch!(self, CourseStore, insert_courses(institution_id, courses))
    }

    async fn replace_courses(
        &self,
        institution_id: InstitutionId,
        courses: &[NewCourse],
    ) -> Result<usize, StorageError> {
        dispatch!(self, CourseStore, replace_courses(institution_id, courses))
    }
}
