use chrono::{DateTime, Utc};
use civic_core::model::{ModuleId, ProgressRecord, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, map_progress_row, module_id_to_i64};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn progress_for_user(&self, user: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, module_id, completed, completed_at
            FROM user_progress
            WHERE user_id = ?1
            ORDER BY module_id ASC
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_progress_row).collect()
    }

    async fn get_progress(
        &self,
        user: UserId,
        module: ModuleId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, module_id, completed, completed_at
            FROM user_progress
            WHERE user_id = ?1 AND module_id = ?2
            ",
        )
        .bind(user.to_string())
        .bind(module_id_to_i64(module)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_progress (user_id, module_id, completed, completed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, module_id) DO UPDATE SET
                completed = excluded.completed,
                completed_at = excluded.completed_at
            ",
        )
        .bind(record.user_id.to_string())
        .bind(module_id_to_i64(record.module_id)?)
        .bind(i64::from(record.completed))
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn toggle_progress(
        &self,
        user: UserId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        // SET expressions read the pre-update row, so both CASEs see the old flag.
        let row = sqlx::query(
            r"
            INSERT INTO user_progress (user_id, module_id, completed, completed_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(user_id, module_id) DO UPDATE SET
                completed = CASE WHEN user_progress.completed = 1 THEN 0 ELSE 1 END,
                completed_at = CASE
                    WHEN user_progress.completed = 1 THEN NULL
                    ELSE excluded.completed_at
                END
            RETURNING user_id, module_id, completed, completed_at
            ",
        )
        .bind(user.to_string())
        .bind(module_id_to_i64(module)?)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        map_progress_row(&row)
    }
}
