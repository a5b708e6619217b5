pub mod challenge;
mod ids;
pub mod institution;
mod module;
pub mod progress;
pub mod quiz;

pub use ids::{InstitutionId, ModuleId, ParseIdError, QuestionId, UserId};

pub use challenge::{Challenge, challenge_for_day, default_challenges};
pub use institution::{Institution, InstitutionDraft, InstitutionError};
pub use module::{Category, Module, ModuleError};
pub use progress::{ModuleStatus, ProgressRecord, ProgressSummary, aggregate};
pub use quiz::{
    AnswerSheet, PASS_THRESHOLD, Question, QuestionError, QuestionOutcome, QuestionProblem,
    QuizScore, score,
};
