//! CourseStore implementation for PgStorage.

use super::*;

use crate::traits::CourseStore;
use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

const INSERT_COURSE_SQL: &str = "INSERT INTO courses (
        college_id, section_id, course_code, title, start_date, start_time, location,
        seats_available, seats_total, price, waitlist_available, registration_url
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)";

fn insert_course_query(
    institution_id: InstitutionId,
    course: &NewCourse,
) -> Result<Query<'_, Postgres, PgArguments>, StorageError> {
    Ok(sqlx::query(INSERT_COURSE_SQL)
        .bind(institution_id.0)
        .bind(&course.section_id)
        .bind(&course.course_code)
        .bind(&course.title)
        .bind(course.start_date)
        .bind(&course.start_time)
        .bind(&course.location)
        .bind(count_to_i32(course.seats_available, "seats_available")?)
        .bind(count_to_i32(course.seats_total, "seats_total")?)
        .bind(&course.price)
        .bind(course.waitlist_available)
        .bind(&course.registration_url))
}

#[async_trait]
impl CourseStore for PgStorage {
    async fn delete_courses_by_institution(
        &self,
        institution_id: InstitutionId,
    ) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM courses WHERE college_id = $1")
            .bind(institution_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_course(
        &self,
        institution_id: InstitutionId,
        course: &NewCourse,
    ) -> Result<(), StorageError> {
        insert_course_query(institution_id, course)?.execute(&self.pool).await?;
        Ok(())
    }

    async fn list_courses(
        &self,
        institution_id: InstitutionId,
    ) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE college_id = $1 ORDER BY id"
        ))
        .bind(institution_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_course).collect()
    }

    /// Delete and insert inside one transaction: readers see either the old
    /// generation or the new one, and a failed insert leaves the old one intact.
    async fn replace_courses(
        &self,
        institution_id: InstitutionId,
        courses: &[NewCourse],
    ) -> Result<usize, StorageError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM courses WHERE college_id = $1")
            .bind(institution_id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        for course in courses {
            insert_course_query(institution_id, course)?.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        tracing::debug!(%institution_id, removed, inserted = courses.len(), "replaced course generation");
        Ok(courses.len())
    }
}
