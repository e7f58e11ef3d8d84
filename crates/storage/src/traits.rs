//! Store capability traits.
//!
//! The sync engine only ever needs these operations, which keeps every
//! backend (and every test double) interchangeable.

use async_trait::async_trait;
use coursesync_core::{Course, Institution, InstitutionId, NewCourse};

use crate::error::StorageError;

/// Institution identity resolution.
#[async_trait]
pub trait InstitutionStore: Send + Sync {
    /// Look up an institution by its unique display name.
    async fn find_institution_by_name(
        &self,
        name: &str,
    ) -> Result<Option<InstitutionId>, StorageError>;

    /// Insert an institution with its static attributes. Returns the new identity.
    async fn insert_institution(
        &self,
        institution: &Institution,
    ) -> Result<InstitutionId, StorageError>;
}

/// Course set operations, always scoped to one owning institution.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Delete every course owned by `institution_id`. Returns the number removed.
    async fn delete_courses_by_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<u64, StorageError>;

    /// Insert one course owned by `institution_id`.
    async fn insert_course(
        &self,
        institution_id: InstitutionId,
        course: &NewCourse,
    ) -> Result<(), StorageError>;

    /// All courses owned by `institution_id`, in insertion order.
    async fn list_courses(&self, institution_id: InstitutionId)
    -> Result<Vec<Course>, StorageError>;

    /// Insert a batch of courses. Returns how many were written.
    ///
    /// Stops at the first failure; earlier rows stay written.
    async fn insert_courses(
        &self,
        institution_id: InstitutionId,
        courses: &[NewCourse],
    ) -> Result<usize, StorageError> {
        for course in courses {
            self.insert_course(institution_id, course).await?;
        }
        Ok(courses.len())
    }

    /// Replace the whole course set of `institution_id` with `courses`.
    ///
    /// Default is delete-then-insert with no transaction; backends that can do
    /// better override it.
    async fn replace_courses(
        &self,
        institution_id: InstitutionId,
        courses: &[NewCourse],
    ) -> Result<usize, StorageError> {
        let removed = self.delete_courses_by_institution(institution_id).await?;
        tracing::debug!(%institution_id, removed, "deleted previous course generation");
        self.insert_courses(institution_id, courses).await
    }
}

/// Everything the sync engine needs from a store.
pub trait SyncStore: InstitutionStore + CourseStore {}

impl<T: InstitutionStore + CourseStore + ?Sized> SyncStore for T {}
