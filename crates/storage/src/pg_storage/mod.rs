//! PostgreSQL storage backend using sqlx.
//!
//! Expects the schema to exist already:
//!
//! ```sql
//! CREATE TABLE colleges (
//!     id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
//!     name TEXT NOT NULL UNIQUE,
//!     city TEXT, zipcode TEXT,
//!     latitude DOUBLE PRECISION, longitude DOUBLE PRECISION
//! );
//! CREATE TABLE courses (
//!     id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
//!     college_id BIGINT NOT NULL REFERENCES colleges (id),
//!     section_id TEXT, course_code TEXT, title TEXT,
//!     start_date DATE, start_time TEXT, location TEXT,
//!     seats_available INTEGER, seats_total INTEGER, price TEXT,
//!     waitlist_available BOOLEAN, registration_url TEXT
//! );
//! ```

mod courses;
mod institutions;

use std::time::Duration;

use coursesync_core::{
    Course, InstitutionId, NewCourse, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS,
    PG_POOL_MAX_CONNECTIONS,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::error::StorageError;

pub(crate) const COURSE_COLUMNS: &str =
    "id, college_id, section_id, course_code, title, start_date, start_time, location,
     seats_available, seats_total, price, waitlist_available, registration_url";

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }
}

/// Bind-ready integer for a `u32` count column.
pub(crate) fn count_to_i32(value: u32, column: &str) -> Result<i32, StorageError> {
    i32::try_from(value)
        .map_err(|e| StorageError::corrupt(format!("{column} exceeds i32::MAX"), e))
}

pub(crate) fn row_to_course(row: &sqlx::postgres::PgRow) -> Result<Course, StorageError> {
    let seats_available: Option<i32> = row.try_get("seats_available")?;
    let seats_total: Option<i32> = row.try_get("seats_total")?;
    Ok(Course {
        id: row.try_get("id")?,
        institution_id: InstitutionId(row.try_get("college_id")?),
        course: NewCourse {
            section_id: row.try_get::<Option<String>, _>("section_id")?.unwrap_or_default(),
            course_code: row.try_get::<Option<String>, _>("course_code")?.unwrap_or_default(),
            title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
            start_date: row.try_get("start_date")?,
            start_time: row.try_get("start_time")?,
            location: row.try_get::<Option<String>, _>("location")?.unwrap_or_default(),
            seats_available: seats_available.and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
            seats_total: seats_total.and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
            price: row.try_get("price")?,
            waitlist_available: row
                .try_get::<Option<bool>, _>("waitlist_available")?
                .unwrap_or(false),
            registration_url: row
                .try_get::<Option<String>, _>("registration_url")?
                .unwrap_or_default(),
        },
    })
}
