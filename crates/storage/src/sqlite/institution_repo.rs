use civic_core::model::Institution;

use super::SqliteRepository;
use super::mapping::{db_err, institution_id_to_i64, map_institution_row};
use crate::repository::{InstitutionRepository, StorageError};

#[async_trait::async_trait]
impl InstitutionRepository for SqliteRepository {
    async fn upsert_institution(&self, institution: &Institution) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO institutions (id, name, location, services, phone, email, paid)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                location = excluded.location,
                services = excluded.services,
                phone = excluded.phone,
                email = excluded.email,
                paid = excluded.paid
            ",
        )
        .bind(institution_id_to_i64(institution.id())?)
        .bind(institution.name().to_owned())
        .bind(institution.location().map(str::to_owned))
        .bind(institution.services().map(str::to_owned))
        .bind(institution.phone().map(str::to_owned))
        .bind(institution.email().map(str::to_owned))
        .bind(i64::from(institution.paid()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, location, services, phone, email, paid
            FROM institutions
            ORDER BY name ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_institution_row).collect()
    }
}
