//! Service layer for coursesync
//!
//! The sync engine (identity resolution + course set replacement) and the
//! orchestrator that runs it over a registry with fault isolation.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Services hold trait objects")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod error;
mod orchestrator;
mod sync_service;

pub use error::SyncError;
pub use orchestrator::{InstitutionOutcome, InstitutionReport, Orchestrator, RunReport, RunSummary};
pub use sync_service::{SyncResult, SyncService, normalize_rows};
