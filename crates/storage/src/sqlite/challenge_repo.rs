use chrono::NaiveDate;
use civic_core::model::UserId;

use super::SqliteRepository;
use super::mapping::db_err;
use crate::repository::{ChallengeRepository, StorageError};

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait::async_trait]
impl ChallengeRepository for SqliteRepository {
    async fn mark_challenge_completed(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO challenge_completions (user_id, completed_on)
            VALUES (?1, ?2)
            ON CONFLICT(user_id, completed_on) DO NOTHING
            ",
        )
        .bind(user.to_string())
        .bind(day_key(date))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn is_challenge_completed(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<bool, StorageError> {
        let row = sqlx::query(
            r"
            SELECT 1 FROM challenge_completions
            WHERE user_id = ?1 AND completed_on = ?2
            ",
        )
        .bind(user.to_string())
        .bind(day_key(date))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.is_some())
    }
}
