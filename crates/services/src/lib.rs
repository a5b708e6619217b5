#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod challenge_service;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod institution_service;
pub mod progress_tracker;
pub mod retry;

pub use civic_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogService, QuestionIssue};
pub use challenge_service::{ChallengeService, DailyChallenge};
pub use config::AppConfig;
pub use dashboard::{Dashboard, ModuleOverview};
pub use error::{
    AppServicesError, CatalogServiceError, ChallengeServiceError, InstitutionServiceError,
    TrackerError,
};
pub use institution_service::InstitutionService;
pub use progress_tracker::{ProgressTracker, QuizSubmission};
pub use retry::RetryPolicy;
