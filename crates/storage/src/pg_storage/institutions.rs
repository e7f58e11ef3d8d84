//! InstitutionStore implementation for PgStorage.

use super::*;

use crate::traits::InstitutionStore;
use async_trait::async_trait;
use coursesync_core::Institution;

#[async_trait]
impl InstitutionStore for PgStorage {
    async fn find_institution_by_name(
        &self,
        name: &str,
    ) -> Result<Option<InstitutionId>, StorageError> {
        let row = sqlx::query("SELECT id FROM colleges WHERE name = $1 ORDER BY id LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get::<i64, _>("id").map(InstitutionId)).transpose().map_err(Into::into)
    }

    async fn insert_institution(
        &self,
        institution: &Institution,
    ) -> Result<InstitutionId, StorageError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO colleges (name, city, zipcode, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&institution.name)
        .bind(&institution.city)
        .bind(&institution.zipcode)
        .bind(institution.latitude)
        .bind(institution.longitude)
        .fetch_one(&self.pool)
        .await?;
        Ok(InstitutionId(id))
    }
}
