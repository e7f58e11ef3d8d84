//! In-process store used for dry runs and as the test double for the sync engine.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use coursesync_core::{Course, Institution, InstitutionId, NewCourse};

use crate::error::StorageError;
use crate::traits::{CourseStore, InstitutionStore};

#[derive(Debug, Default)]
struct MemoryState {
    institutions: Vec<(InstitutionId, Institution)>,
    courses: Vec<Course>,
    next_institution_id: i64,
    next_course_id: i64,
}

impl MemoryState {
    fn push_course(&mut self, institution_id: InstitutionId, course: &NewCourse) {
        self.next_course_id += 1;
        self.courses.push(Course {
            id: self.next_course_id,
            institution_id,
            course: course.clone(),
        });
    }
}

/// Mutex-guarded store with sequential identities, starting at 1.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of stored institutions, in creation order.
    #[must_use]
    pub fn institutions(&self) -> Vec<(InstitutionId, Institution)> {
        self.state().institutions.clone()
    }

    /// Snapshot of every stored course, across institutions.
    #[must_use]
    pub fn courses(&self) -> Vec<Course> {
        self.state().courses.clone()
    }

    #[must_use]
    pub fn course_count(&self) -> usize {
        self.state().courses.len()
    }
}

#[async_trait]
impl InstitutionStore for MemoryStorage {
    async fn find_institution_by_name(
        &self,
        name: &str,
    ) -> Result<Option<InstitutionId>, StorageError> {
        Ok(self.state().institutions.iter().find(|(_, i)| i.name == name).map(|(id, _)| *id))
    }

    async fn insert_institution(
        &self,
        institution: &Institution,
    ) -> Result<InstitutionId, StorageError> {
        let mut state = self.state();
        if state.institutions.iter().any(|(_, i)| i.name == institution.name) {
            return Err(StorageError::Duplicate(format!("institution {}", institution.name)));
        }
        state.next_institution_id += 1;
        let id = InstitutionId(state.next_institution_id);
        state.institutions.push((id, institution.clone()));
        Ok(id)
    }
}

#[async_trait]
impl CourseStore for MemoryStorage {
    async fn delete_courses_by_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<u64, StorageError> {
        let mut state = self.state();
        let before = state.courses.len();
        state.courses.retain(|c| c.institution_id != institution_id);
        Ok(u64::try_from(before - state.courses.len()).unwrap_or(u64::MAX))
    }

    async fn insert_course(
        &self,
        institution_id: InstitutionId,
        course: &NewCourse,
    ) -> Result<(), StorageError> {
        self.state().push_course(institution_id, course);
        Ok(())
    }

    async fn list_courses(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<Course>, StorageError> {
        Ok(self
            .state()
            .courses
            .iter()
            .filter(|c| c.institution_id == institution_id)
            .cloned()
            .collect())
    }

    /// Swaps the generation under a single lock, so no reader sees an empty set.
    async fn replace_courses(
        &self,
        institution_id: InstitutionId,
        courses: &[NewCourse],
    ) -> Result<usize, StorageError> {
        let mut state = self.state();
        state.courses.retain(|c| c.institution_id != institution_id);
        for course in courses {
            state.push_course(institution_id, course);
        }
        Ok(courses.len())
    }
}
