use civic_core::model::{
    Category, Institution, InstitutionDraft, InstitutionId, Module, ModuleId, ProgressRecord,
    Question, QuestionId, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Classifies a driver error. Constraint violations are conflicts and rows
/// that cannot be decoded are serialization errors. Only what is left counts
/// as a connection-level failure.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::RowNotFound => StorageError::NotFound,
        sqlx::Error::Database(db)
            if db.is_unique_violation()
                || db.is_foreign_key_violation()
                || db.is_check_violation() =>
        {
            StorageError::Conflict
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::TypeNotFound { .. } => StorageError::Serialization(e.to_string()),
        _ => StorageError::Connection(e.to_string()),
    }
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn module_id_to_i64(id: ModuleId) -> Result<i64, StorageError> {
    u64_to_i64("module_id", id.value())
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    u64_to_i64("question_id", id.value())
}

pub(crate) fn module_id_from_i64(v: i64) -> Result<ModuleId, StorageError> {
    Ok(ModuleId::new(i64_to_u64("module_id", v)?))
}

pub(crate) fn institution_id_to_i64(id: InstitutionId) -> Result<i64, StorageError> {
    u64_to_i64("institution_id", id.value())
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn user_id_from_str(raw: &str) -> Result<UserId, StorageError> {
    raw.parse::<UserId>().map_err(ser)
}

pub(crate) fn encode_options(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn decode_options(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_module_row(row: &SqliteRow) -> Result<Module, StorageError> {
    let category: String = row.try_get("category").map_err(ser)?;
    Ok(Module::from_persisted(
        module_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        Category::parse(&category).map_err(ser)?,
        row.try_get("level").map_err(ser)?,
        row.try_get("title").map_err(ser)?,
        row.try_get("content").map_err(ser)?,
    ))
}

/// Loads whatever was stored; content checks belong to the catalog audit.
pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let options: String = row.try_get("options").map_err(ser)?;
    Ok(Question::from_persisted(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        module_id_from_i64(row.try_get::<i64, _>("module_id").map_err(ser)?)?,
        row.try_get("question").map_err(ser)?,
        decode_options(&options)?,
        row.try_get("correct_answer").map_err(ser)?,
    ))
}

pub(crate) fn map_institution_row(row: &SqliteRow) -> Result<Institution, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let paid: i64 = row.try_get("paid").map_err(ser)?;
    Ok(Institution::from_persisted(
        InstitutionId::new(i64_to_u64("institution_id", id)?),
        InstitutionDraft {
            name: row.try_get("name").map_err(ser)?,
            location: row.try_get("location").map_err(ser)?,
            services: row.try_get("services").map_err(ser)?,
            phone: row.try_get("phone").map_err(ser)?,
            email: row.try_get("email").map_err(ser)?,
            paid: paid != 0,
        },
    ))
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let user: String = row.try_get("user_id").map_err(ser)?;
    let completed: i64 = row.try_get("completed").map_err(ser)?;
    Ok(ProgressRecord {
        user_id: user_id_from_str(&user)?,
        module_id: module_id_from_i64(row.try_get::<i64, _>("module_id").map_err(ser)?)?,
        completed: completed != 0,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}
