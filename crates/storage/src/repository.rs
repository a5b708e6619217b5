use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use civic_core::model::{
    Institution, InstitutionId, Module, ModuleId, ProgressRecord, Question, QuestionId, UserId,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A previous writer panicked while holding in-process state.
    #[error("storage lock poisoned: {0}")]
    Poisoned(String),
}

impl StorageError {
    /// Failures worth one more attempt (the store may not have seen the request).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }
}

/// Read access to modules and their quizzes, plus writes used for seeding.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Persist or update a module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored.
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError>;

    /// Persist or update a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// All modules, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_modules(&self) -> Result<Vec<Module>, StorageError>;

    /// Fetch a module by ID. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError>;

    /// Questions for a module, ordered by question ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn questions_for_module(&self, id: ModuleId) -> Result<Vec<Question>, StorageError>;
}

/// Per-user completion records keyed by (user, module).
///
/// Implementations must keep at most one record per pair.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// All records for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn progress_for_user(&self, user: UserId) -> Result<Vec<ProgressRecord>, StorageError>;

    /// The record for one pair, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn get_progress(
        &self,
        user: UserId,
        module: ModuleId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Insert or overwrite the record for `(record.user_id, record.module_id)`.
    ///
    /// Atomic and idempotent under repeated identical calls.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is rejected.
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// Atomically flip the completion flag for a pair and return the stored result.
    ///
    /// A missing record becomes completed at `now`; see `ProgressRecord::toggled`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is rejected.
    async fn toggle_progress(
        &self,
        user: UserId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError>;
}

/// Daily challenge completions, one per (user, date).
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is rejected.
    async fn mark_challenge_completed(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn is_challenge_completed(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<bool, StorageError>;
}

/// Directory of support institutions.
#[async_trait]
pub trait InstitutionRepository: Send + Sync {
    /// Persist or update an institution.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is rejected.
    async fn upsert_institution(&self, institution: &Institution) -> Result<(), StorageError>;

    /// All institutions, ordered by name then id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_institutions(&self) -> Result<Vec<Institution>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    modules: Arc<Mutex<HashMap<ModuleId, Module>>>,
    questions: Arc<Mutex<BTreeMap<(ModuleId, QuestionId), Question>>>,
    progress: Arc<Mutex<HashMap<(UserId, ModuleId), ProgressRecord>>>,
    challenges: Arc<Mutex<HashSet<(UserId, NaiveDate)>>>,
    institutions: Arc<Mutex<HashMap<InstitutionId, Institution>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Poisoned(e.to_string())
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        let mut guard = self.modules.lock().map_err(poisoned)?;
        guard.insert(module.id(), module.clone());
        Ok(())
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert((question.module_id(), question.id()), question.clone());
        Ok(())
    }

    async fn list_modules(&self) -> Result<Vec<Module>, StorageError> {
        let guard = self.modules.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let guard = self.modules.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn questions_for_module(&self, id: ModuleId) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        Ok(guard
            .range((id, QuestionId::new(0))..=(id, QuestionId::new(u64::MAX)))
            .map(|(_, q)| q.clone())
            .collect())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn progress_for_user(&self, user: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        let mut records: Vec<ProgressRecord> = guard
            .values()
            .filter(|r| r.user_id == user)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.module_id);
        Ok(records)
    }

    async fn get_progress(
        &self,
        user: UserId,
        module: ModuleId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(&(user, module)).cloned())
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert((record.user_id, record.module_id), record.clone());
        Ok(())
    }

    async fn toggle_progress(
        &self,
        user: UserId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        let next = ProgressRecord::toggled(guard.get(&(user, module)), user, module, now);
        guard.insert((user, module), next.clone());
        Ok(next)
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryRepository {
    async fn mark_challenge_completed(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<(), StorageError> {
        let mut guard = self.challenges.lock().map_err(poisoned)?;
        guard.insert((user, date));
        Ok(())
    }

    async fn is_challenge_completed(
        &self,
        user: UserId,
        date: NaiveDate,
    ) -> Result<bool, StorageError> {
        let guard = self.challenges.lock().map_err(poisoned)?;
        Ok(guard.contains(&(user, date)))
    }
}

#[async_trait]
impl InstitutionRepository for InMemoryRepository {
    async fn upsert_institution(&self, institution: &Institution) -> Result<(), StorageError> {
        let mut guard = self.institutions.lock().map_err(poisoned)?;
        guard.insert(institution.id(), institution.clone());
        Ok(())
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>, StorageError> {
        let guard = self.institutions.lock().map_err(poisoned)?;
        let mut institutions: Vec<Institution> = guard.values().cloned().collect();
        institutions.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        Ok(institutions)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub challenges: Arc<dyn ChallengeRepository>,
    pub institutions: Arc<dyn InstitutionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let challenges: Arc<dyn ChallengeRepository> = Arc::new(repo.clone());
        let institutions: Arc<dyn InstitutionRepository> = Arc::new(repo);
        Self {
            catalog,
            progress,
            challenges,
            institutions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::model::{Category, InstitutionDraft};
    use civic_core::time::fixed_now;

    fn build_module(id: u64) -> Module {
        Module::new(
            ModuleId::new(id),
            Category::Civic,
            "beginner",
            format!("Module {id}"),
            "Body",
        )
        .unwrap()
    }

    fn build_question(id: u64, module: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            ModuleId::new(module),
            format!("Q{id}"),
            vec!["A".into(), "B".into()],
            "A",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn questions_are_scoped_to_module_and_ordered() {
        let repo = InMemoryRepository::new();
        repo.upsert_module(&build_module(1)).await.unwrap();
        repo.upsert_module(&build_module(2)).await.unwrap();
        repo.upsert_question(&build_question(3, 1)).await.unwrap();
        repo.upsert_question(&build_question(1, 1)).await.unwrap();
        repo.upsert_question(&build_question(2, 2)).await.unwrap();

        let questions = repo.questions_for_module(ModuleId::new(1)).await.unwrap();
        let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn upsert_keeps_one_record_per_pair() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let module = ModuleId::new(1);

        let record = ProgressRecord::completed(user, module, fixed_now());
        repo.upsert_progress(&record).await.unwrap();
        repo.upsert_progress(&record).await.unwrap();
        repo.toggle_progress(user, module, fixed_now()).await.unwrap();

        let records = repo.progress_for_user(user).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].completed);
        assert_eq!(records[0].completed_at, None);
    }

    #[tokio::test]
    async fn progress_is_isolated_per_user() {
        let repo = InMemoryRepository::new();
        let alice = UserId::random();
        let bob = UserId::random();
        repo.toggle_progress(alice, ModuleId::new(1), fixed_now())
            .await
            .unwrap();

        assert!(repo.progress_for_user(bob).await.unwrap().is_empty());
        assert!(
            repo.get_progress(alice, ModuleId::new(1))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn challenge_completion_is_per_day() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let today = fixed_now().date_naive();

        repo.mark_challenge_completed(user, today).await.unwrap();
        repo.mark_challenge_completed(user, today).await.unwrap();

        assert!(repo.is_challenge_completed(user, today).await.unwrap());
        assert!(
            !repo
                .is_challenge_completed(user, today.succ_opt().unwrap())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn institutions_list_by_name() {
        let repo = InMemoryRepository::new();
        for (id, name) in [(1, "Youth Helpline"), (2, "City Clinic"), (3, "Legal Aid")] {
            let institution = InstitutionDraft::new(name)
                .validate(InstitutionId::new(id))
                .unwrap();
            repo.upsert_institution(&institution).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_institutions()
            .await
            .unwrap()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, vec!["City Clinic", "Legal Aid", "Youth Helpline"]);
    }

    #[test]
    fn only_connection_errors_are_transient() {
        assert!(StorageError::Connection("reset".into()).is_transient());
        assert!(!StorageError::Poisoned("panicked".into()).is_transient());
        assert!(!StorageError::Serialization("bad row".into()).is_transient());
        assert!(!StorageError::Conflict.is_transient());
    }

    #[tokio::test]
    async fn poisoned_lock_is_not_transient() {
        let repo = InMemoryRepository::new();
        let modules = Arc::clone(&repo.modules);
        let _ = std::thread::spawn(move || {
            let _guard = modules.lock().unwrap();
            panic!("writer died");
        })
        .join();

        let err = repo.list_modules().await.unwrap_err();
        assert!(matches!(err, StorageError::Poisoned(_)));
        assert!(!err.is_transient());
    }
}
