use civic_core::model::{Module, ModuleId, Question};

use super::SqliteRepository;
use super::mapping::{
    db_err, encode_options, map_module_row, map_question_row, module_id_to_i64,
    question_id_to_i64,
};
use crate::repository::{CatalogRepository, StorageError};

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO modules (id, category, level, title, content)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                category = excluded.category,
                level = excluded.level,
                title = excluded.title,
                content = excluded.content
            ",
        )
        .bind(module_id_to_i64(module.id())?)
        .bind(module.category().as_str())
        .bind(module.level().to_owned())
        .bind(module.title().to_owned())
        .bind(module.content().to_owned())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_questions (id, module_id, question, options, correct_answer)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                module_id = excluded.module_id,
                question = excluded.question,
                options = excluded.options,
                correct_answer = excluded.correct_answer
            ",
        )
        .bind(question_id_to_i64(question.id())?)
        .bind(module_id_to_i64(question.module_id())?)
        .bind(question.text().to_owned())
        .bind(encode_options(question.options())?)
        .bind(question.correct_answer().to_owned())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list_modules(&self) -> Result<Vec<Module>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, category, level, title, content
            FROM modules
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_module_row).collect()
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, category, level, title, content
            FROM modules WHERE id = ?1
            ",
        )
        .bind(module_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_module_row).transpose()
    }

    async fn questions_for_module(&self, id: ModuleId) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, module_id, question, options, correct_answer
            FROM quiz_questions
            WHERE module_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(module_id_to_i64(id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_question_row).collect()
    }
}
