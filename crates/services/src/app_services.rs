use std::sync::Arc;

use civic_core::model::UserId;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::challenge_service::ChallengeService;
use crate::config::AppConfig;
use crate::error::AppServicesError;
use crate::institution_service::InstitutionService;
use crate::progress_tracker::ProgressTracker;
use crate::retry::RetryPolicy;

/// Assembles the services a signed-in user's dashboard talks to.
#[derive(Clone)]
pub struct AppServices {
    user_id: UserId,
    catalog: Arc<CatalogService>,
    tracker: Arc<ProgressTracker>,
    challenges: Arc<ChallengeService>,
    institutions: Arc<InstitutionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage at `config.db_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn from_config(
        config: &AppConfig,
        clock: Clock,
        user_id: UserId,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        log::info!("services ready on {} for user {user_id}", config.db_url);
        Ok(Self::with_storage(&storage, clock, user_id, config.retry))
    }

    /// Wire services over an existing storage bundle.
    #[must_use]
    pub fn with_storage(
        storage: &Storage,
        clock: Clock,
        user_id: UserId,
        retry: RetryPolicy,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(Arc::clone(&storage.catalog)));
        let tracker = Arc::new(
            ProgressTracker::new(
                clock,
                user_id,
                Arc::clone(&storage.catalog),
                Arc::clone(&storage.progress),
            )
            .with_retry(retry),
        );
        let challenges = Arc::new(ChallengeService::new(
            clock,
            user_id,
            Arc::clone(&storage.challenges),
        ));

        let institutions = Arc::new(InstitutionService::new(Arc::clone(&storage.institutions)));

        Self {
            user_id,
            catalog,
            tracker,
            challenges,
            institutions,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn tracker(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.tracker)
    }

    #[must_use]
    pub fn challenges(&self) -> Arc<ChallengeService> {
        Arc::clone(&self.challenges)
    }

    #[must_use]
    pub fn institutions(&self) -> Arc<InstitutionService> {
        Arc::clone(&self.institutions)
    }
}
