use thiserror::Error;

use crate::model::{InstitutionError, ModuleError, QuestionError};

/// Any domain validation failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Institution(#[from] InstitutionError),
}
