use std::sync::Arc;

use civic_core::model::{
    AnswerSheet, ModuleId, ModuleStatus, ProgressRecord, ProgressSummary, Question, QuizScore,
    UserId,
};
use civic_core::time::Clock;
use storage::repository::{CatalogRepository, ProgressRepository, StorageError};

use crate::dashboard::Dashboard;
use crate::error::TrackerError;
use crate::retry::RetryPolicy;

/// Outcome of a quiz submission.
///
/// `record` is the row that was written, or `None` when the score was below
/// the pass threshold and nothing was persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSubmission {
    pub score: QuizScore,
    pub record: Option<ProgressRecord>,
}

impl QuizSubmission {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.score.passed()
    }
}

/// Drives one user's module progress: quiz scoring, completion and toggles.
///
/// Holds no state between calls beyond its collaborators. Nothing is reported
/// as changed until the store has accepted the write.
#[derive(Clone)]
pub struct ProgressTracker {
    clock: Clock,
    user_id: UserId,
    catalog: Arc<dyn CatalogRepository>,
    progress: Arc<dyn ProgressRepository>,
    retry: RetryPolicy,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(
        clock: Clock,
        user_id: UserId,
        catalog: Arc<dyn CatalogRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            user_id,
            catalog,
            progress,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy for idempotent persistence calls.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Questions for a module, in presentation order.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the catalog cannot be read.
    pub async fn load_quiz(&self, module_id: ModuleId) -> Result<Vec<Question>, TrackerError> {
        let catalog = &self.catalog;
        let questions = self
            .retry
            .run("load quiz", || catalog.questions_for_module(module_id))
            .await?;
        Ok(questions)
    }

    /// Score `answers` against the module's quiz and complete the module on a pass.
    ///
    /// A failing score writes nothing, so a module never passed stays
    /// `NotStarted`. A pass after an earlier completion overwrites the
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::ModuleNotFound` for unknown modules,
    /// `TrackerError::NotSaved` (carrying the score) when a passing result
    /// cannot be stored, and `TrackerError::Storage` when a read fails.
    pub async fn submit_quiz(
        &self,
        module_id: ModuleId,
        answers: &AnswerSheet,
    ) -> Result<QuizSubmission, TrackerError> {
        self.require_module(module_id).await?;
        let questions = self.load_quiz(module_id).await?;
        let score = civic_core::model::score(&questions, answers);

        if !score.passed() {
            log::debug!(
                "user {} scored {:.0}% on module {module_id}; not completed",
                self.user_id,
                score.percentage()
            );
            return Ok(QuizSubmission {
                score,
                record: None,
            });
        }

        let record = ProgressRecord::completed(self.user_id, module_id, self.clock.now());
        if let Err(source) = self.persist(&record).await {
            return Err(TrackerError::NotSaved { score, source });
        }
        log::info!(
            "user {} completed module {module_id} with {:.0}%",
            self.user_id,
            score.percentage()
        );

        Ok(QuizSubmission {
            score,
            record: Some(record),
        })
    }

    /// Manual completion override, independent of any quiz.
    ///
    /// The flip happens inside the store in one step. Not retried.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::ModuleNotFound` for unknown modules and
    /// `TrackerError::Storage` if the store rejects the write.
    pub async fn toggle_completion(
        &self,
        module_id: ModuleId,
    ) -> Result<ProgressRecord, TrackerError> {
        self.require_module(module_id).await?;
        let record = self
            .progress
            .toggle_progress(self.user_id, module_id, self.clock.now())
            .await
            .inspect_err(|e| {
                log::warn!("toggle of module {module_id} for {} failed: {e}", self.user_id);
            })?;

        log::info!(
            "user {} toggled module {module_id}: completed={}",
            self.user_id,
            record.completed
        );
        Ok(record)
    }

    /// Complete a module that has no quiz.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::QuizAvailable` if the module has questions,
    /// `TrackerError::ModuleNotFound` for unknown modules and
    /// `TrackerError::Storage` on persistence failures.
    pub async fn mark_completed_no_quiz(
        &self,
        module_id: ModuleId,
    ) -> Result<ProgressRecord, TrackerError> {
        self.require_module(module_id).await?;
        if !self.load_quiz(module_id).await?.is_empty() {
            return Err(TrackerError::QuizAvailable(module_id));
        }

        let record = ProgressRecord::completed(self.user_id, module_id, self.clock.now());
        self.persist(&record).await?;
        log::info!("user {} completed quiz-less module {module_id}", self.user_id);
        Ok(record)
    }

    /// Current status of one module for this user.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if progress cannot be read.
    pub async fn module_status(&self, module_id: ModuleId) -> Result<ModuleStatus, TrackerError> {
        let progress = &self.progress;
        let user = self.user_id;
        let record = self
            .retry
            .run("read progress", || progress.get_progress(user, module_id))
            .await?;
        Ok(ModuleStatus::from_record(record.as_ref()))
    }

    /// Completed/total over the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the catalog or progress cannot be read.
    pub async fn progress_summary(&self) -> Result<ProgressSummary, TrackerError> {
        Ok(self.dashboard().await?.summary)
    }

    /// Module list joined with this user's progress.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the catalog or progress cannot be read.
    pub async fn dashboard(&self) -> Result<Dashboard, TrackerError> {
        let catalog = &self.catalog;
        let progress = &self.progress;
        let user = self.user_id;

        let modules = self
            .retry
            .run("list modules", || catalog.list_modules())
            .await?;
        let records = self
            .retry
            .run("read progress", || progress.progress_for_user(user))
            .await?;

        Ok(Dashboard::build(modules, &records))
    }

    async fn require_module(&self, module_id: ModuleId) -> Result<(), TrackerError> {
        let catalog = &self.catalog;
        self.retry
            .run("get module", || catalog.get_module(module_id))
            .await?
            .map(|_| ())
            .ok_or(TrackerError::ModuleNotFound(module_id))
    }

    async fn persist(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let progress = &self.progress;
        self.retry
            .run("upsert progress", || progress.upsert_progress(record))
            .await
            .inspect_err(|e| {
                log::warn!(
                    "saving progress on module {} for {} failed: {e}",
                    record.module_id,
                    record.user_id
                );
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::model::{Category, Module, QuestionId};
    use civic_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    async fn setup(question_answers: &[&str]) -> (InMemoryRepository, ProgressTracker) {
        let repo = InMemoryRepository::new();
        let module = Module::new(ModuleId::new(1), Category::Civic, "beginner", "Rights", "")
            .unwrap();
        repo.upsert_module(&module).await.unwrap();
        for (i, correct) in question_answers.iter().enumerate() {
            let q = Question::new(
                QuestionId::new(i as u64 + 1),
                module.id(),
                format!("Q{i}"),
                vec!["A".into(), "B".into(), "C".into()],
                *correct,
            )
            .unwrap();
            repo.upsert_question(&q).await.unwrap();
        }

        let tracker = ProgressTracker::new(
            Clock::fixed(fixed_now()),
            UserId::random(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        (repo, tracker)
    }

    #[tokio::test]
    async fn passing_quiz_completes_module() {
        let (repo, tracker) = setup(&["A", "B"]).await;
        let answers: AnswerSheet = [(0, "A"), (1, "B")].into_iter().collect();

        let submission = tracker.submit_quiz(ModuleId::new(1), &answers).await.unwrap();
        assert_eq!(submission.score.percentage(), 100.0);
        assert!(submission.passed());

        let stored = repo
            .get_progress(tracker.user_id(), ModuleId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.completed);
        assert_eq!(stored.completed_at, Some(fixed_now()));
        assert_eq!(submission.record, Some(stored));
    }

    #[tokio::test]
    async fn failing_quiz_writes_nothing() {
        let (repo, tracker) = setup(&["A", "B"]).await;
        let answers: AnswerSheet = [(0, "A"), (1, "C")].into_iter().collect();

        let submission = tracker.submit_quiz(ModuleId::new(1), &answers).await.unwrap();
        assert_eq!(submission.score.percentage(), 50.0);
        assert!(submission.record.is_none());

        assert!(
            repo.progress_for_user(tracker.user_id())
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            tracker.module_status(ModuleId::new(1)).await.unwrap(),
            ModuleStatus::NotStarted
        );
    }

    #[tokio::test]
    async fn unknown_module_is_reported() {
        let (_repo, tracker) = setup(&["A"]).await;
        let err = tracker
            .toggle_completion(ModuleId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::ModuleNotFound(id) if id == ModuleId::new(99)));
    }

    #[tokio::test]
    async fn quiz_less_completion_refused_when_quiz_exists() {
        let (_repo, tracker) = setup(&["A"]).await;
        let err = tracker
            .mark_completed_no_quiz(ModuleId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::QuizAvailable(_)));
    }
}
