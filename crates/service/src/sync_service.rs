use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use coursesync_core::{
    DEFAULT_STORE_TIMEOUT_SECS, Institution, InstitutionId, NewCourse, RawRow, RowContext,
    normalize_row,
};
use coursesync_storage::{CourseStore, InstitutionStore, StorageError, SyncStore};

use crate::SyncError;

/// Counters for one institution's sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncResult {
    pub rows_received: usize,
    pub courses_saved: usize,
    pub rows_rejected: usize,
}

impl SyncResult {
    /// Upstream had rows but none of them normalized.
    #[must_use]
    pub const fn all_rows_rejected(&self) -> bool {
        self.rows_received > 0 && self.rows_rejected == self.rows_received
    }
}

/// Replaces an institution's persisted course set with the rows of one fetch.
pub struct SyncService {
    store: Arc<dyn SyncStore>,
    store_timeout: Duration,
}

impl SyncService {
    #[must_use]
    pub fn new(store: Arc<dyn SyncStore>) -> Self {
        Self { store, store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS) }
    }

    /// Bound every store call by `timeout` instead of the default.
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Sync one institution: resolve its identity, normalize `rows`, then
    /// replace the stored course set with the rows that normalized.
    ///
    /// Rows that fail to normalize are logged and counted in
    /// [`SyncResult::rows_rejected`]; they never fail the institution.
    pub async fn sync(
        &self,
        institution: &Institution,
        ctx: &RowContext,
        rows: &[RawRow],
    ) -> Result<SyncResult, SyncError> {
        let name = institution.name.as_str();
        let institution_id = self.resolve_identity(institution).await?;

        let courses = normalize_rows(name, ctx, rows);
        let rows_rejected = rows.len().saturating_sub(courses.len());

        let courses_saved = self
            .bounded(name, "course replace", self.store.replace_courses(institution_id, &courses))
            .await?
            .map_err(|source| SyncError::Store { name: name.to_owned(), source })?;

        tracing::debug!(
            institution = name,
            %institution_id,
            rows = rows.len(),
            saved = courses_saved,
            rejected = rows_rejected,
            "replaced course set"
        );
        Ok(SyncResult { rows_received: rows.len(), courses_saved, rows_rejected })
    }

    /// Look the institution up by name, inserting it if it does not exist yet.
    pub async fn resolve_identity(
        &self,
        institution: &Institution,
    ) -> Result<InstitutionId, SyncError> {
        let name = institution.name.as_str();
        let identity_error =
            |source: StorageError| SyncError::IdentityResolution { name: name.to_owned(), source };

        let found = self
            .bounded(name, "institution lookup", self.store.find_institution_by_name(name))
            .await?
            .map_err(identity_error)?;
        if let Some(id) = found {
            return Ok(id);
        }

        match self
            .bounded(name, "institution insert", self.store.insert_institution(institution))
            .await?
        {
            Ok(id) => {
                tracing::info!(institution = name, %id, "registered new institution");
                Ok(id)
            },
            // Another writer inserted the same name between our lookup and insert.
            Err(err) if err.is_duplicate() => self
                .bounded(name, "institution lookup", self.store.find_institution_by_name(name))
                .await?
                .map_err(identity_error)?
                .ok_or_else(|| identity_error(err)),
            Err(err) => Err(identity_error(err)),
        }
    }

    async fn bounded<T, F>(
        &self,
        name: &str,
        operation: &'static str,
        call: F,
    ) -> Result<Result<T, StorageError>, SyncError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        tokio::time::timeout(self.store_timeout, call).await.map_err(|_elapsed| {
            SyncError::Timeout { name: name.to_owned(), operation, after: self.store_timeout }
        })
    }
}

/// Normalize every row independently, dropping (and logging) the ones that fail.
#[must_use]
pub fn normalize_rows(institution: &str, ctx: &RowContext, rows: &[RawRow]) -> Vec<NewCourse> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match normalize_row(row, ctx) {
            Ok(course) => Some(course),
            Err(e) => {
                tracing::warn!(institution, row = index, error = %e, "skipping unparsable row");
                None
            },
        })
        .collect()
}
