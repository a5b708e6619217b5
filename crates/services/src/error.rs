//! Shared error types for the services crate.

use thiserror::Error;

use civic_core::model::{ModuleId, QuizScore};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressTracker`.
///
/// Unanswered questions and empty quizzes are not errors; they score as wrong / 0.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),
    #[error("module {0} has a quiz; complete it by passing the quiz")]
    QuizAvailable(ModuleId),
    /// The quiz was passed but the completion could not be stored. The score
    /// is kept so the result can still be shown and the save retried.
    #[error("quiz scored {:.0}% but was not saved: {source}", .score.percentage())]
    NotSaved {
        score: QuizScore,
        source: StorageError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ChallengeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChallengeServiceError {
    #[error("no challenges configured")]
    Empty,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `InstitutionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstitutionServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
