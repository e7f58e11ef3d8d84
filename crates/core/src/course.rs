use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::institution::InstitutionId;

/// One unparsed record from the upstream `data` array.
///
/// Kept as raw JSON so a malformed row fails on its own during normalization
/// instead of failing the whole response decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(pub serde_json::Value);

impl From<serde_json::Value> for RawRow {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// A normalized course, not yet tied to a stored institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub section_id: String,
    pub course_code: String,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub location: String,
    pub seats_available: u32,
    pub seats_total: u32,
    pub price: Option<String>,
    pub waitlist_available: bool,
    pub registration_url: String,
}

/// A course row as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub institution_id: InstitutionId,
    #[serde(flatten)]
    pub course: NewCourse,
}
