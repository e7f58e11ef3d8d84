//! Drives the fetch → sync pipeline over every institution of a registry.
//!
//! One institution's failure never stops the run. Work is dispatched in
//! registry order with a bounded number in flight; results are collected in
//! the same order, so the summary and the log stay deterministic.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use coursesync_core::{DEFAULT_CONCURRENCY, Institution, MAX_CONCURRENCY, Provider, Registry};
use coursesync_fetch::{CourseFeedClient, FetchError};
use futures_util::StreamExt;
use futures_util::stream;

use crate::{SyncError, SyncResult, SyncService};

/// What happened to one institution during a run.
#[derive(Debug)]
pub enum InstitutionOutcome {
    /// Courses were replaced with at least one normalized row.
    Synced(SyncResult),
    /// Upstream listed no rows; the stored set was cleared.
    Empty,
    /// Upstream had rows but none normalized.
    AllRowsRejected(SyncResult),
    FetchFailed(FetchError),
    SyncFailed(SyncError),
    /// The run was cancelled before this institution was dispatched.
    Skipped,
}

impl InstitutionOutcome {
    fn from_sync(result: SyncResult) -> Self {
        if result.rows_received == 0 {
            Self::Empty
        } else if result.all_rows_rejected() {
            Self::AllRowsRejected(result)
        } else {
            Self::Synced(result)
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Synced(_) | Self::Empty)
    }

    /// Courses written for this institution. Failed institutions contribute nothing.
    #[must_use]
    pub const fn courses_saved(&self) -> usize {
        match self {
            Self::Synced(result) => result.courses_saved,
            _ => 0,
        }
    }
}

/// Outcome of one institution, tagged with its name.
#[derive(Debug)]
pub struct InstitutionReport {
    pub name: String,
    pub outcome: InstitutionOutcome,
}

/// Aggregate counters of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_courses: usize,
}

impl RunSummary {
    /// Fold per-institution reports into counters.
    #[must_use]
    pub fn from_reports(reports: &[InstitutionReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.record(&report.outcome);
        }
        summary
    }

    fn record(&mut self, outcome: &InstitutionOutcome) {
        if matches!(outcome, InstitutionOutcome::Skipped) {
            self.skipped += 1;
            return;
        }
        self.attempted += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.total_courses += outcome.courses_saved();
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Colleges attempted: {}", self.attempted)?;
        writeln!(f, "Successful: {}", self.succeeded)?;
        writeln!(f, "Failed: {}", self.failed)?;
        if self.skipped > 0 {
            writeln!(f, "Skipped: {}", self.skipped)?;
        }
        write!(f, "Total courses saved: {}", self.total_courses)
    }
}

/// Result of [`Orchestrator::run`].
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub institutions: Vec<InstitutionReport>,
}

pub struct Orchestrator {
    fetcher: CourseFeedClient,
    sync: SyncService,
    concurrency: usize,
    cancelled: Arc<AtomicBool>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(fetcher: CourseFeedClient, sync: SyncService) -> Self {
        Self {
            fetcher,
            sync,
            concurrency: DEFAULT_CONCURRENCY,
            cancelled: Arc::new(AtomicBool::new(false)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Number of institutions processed at once, clamped to `1..=MAX_CONCURRENCY`.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Flag that stops dispatch of further institutions once set.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Process every institution of `registry` in order.
    pub async fn run(&self, registry: &Registry) -> RunReport {
        tracing::info!(
            institutions = registry.len(),
            concurrency = self.concurrency,
            "starting course sync"
        );

        let institutions: Vec<InstitutionReport> = stream::iter(&registry.institutions)
            .map(|institution| self.process(&registry.provider, institution))
            .buffered(self.concurrency)
            .collect()
            .await;

        let summary = RunSummary::from_reports(&institutions);
        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            total_courses = summary.total_courses,
            "course sync finished"
        );
        RunReport { summary, institutions }
    }

    async fn process(&self, provider: &Provider, institution: &Institution) -> InstitutionReport {
        let name = institution.name.clone();
        if self.cancelled.load(Ordering::Acquire) {
            tracing::info!(institution = %name, "run cancelled, skipping");
            return InstitutionReport { name, outcome: InstitutionOutcome::Skipped };
        }

        let lock = self.lock_for(&name);
        let _guard = lock.lock().await;

        let outcome = match self.fetcher.fetch(provider, institution).await {
            Err(e) => {
                tracing::error!(
                    institution = %name,
                    error = %e,
                    transient = e.is_transient(),
                    "fetch failed, stored courses left untouched"
                );
                InstitutionOutcome::FetchFailed(e)
            },
            Ok(rows) => {
                let ctx = provider.row_context(institution);
                match self.sync.sync(institution, &ctx, &rows).await {
                    Ok(result) => InstitutionOutcome::from_sync(result),
                    Err(e) => {
                        tracing::error!(
                            institution = %name,
                            error = %e,
                            transient = e.is_transient(),
                            "sync failed"
                        );
                        InstitutionOutcome::SyncFailed(e)
                    },
                }
            },
        };

        match &outcome {
            InstitutionOutcome::Synced(result) => tracing::info!(
                institution = %name,
                saved = result.courses_saved,
                rejected = result.rows_rejected,
                "synced"
            ),
            InstitutionOutcome::Empty => {
                tracing::info!(institution = %name, "no courses listed upstream");
            },
            InstitutionOutcome::AllRowsRejected(result) => tracing::error!(
                institution = %name,
                rows = result.rows_received,
                "every upstream row was rejected"
            ),
            _ => {},
        }
        InstitutionReport { name, outcome }
    }

    fn lock_for(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(name.to_owned()).or_default())
    }
}
