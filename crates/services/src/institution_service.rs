use std::sync::Arc;

use civic_core::model::Institution;
use storage::repository::InstitutionRepository;

use crate::error::InstitutionServiceError;

/// Read access to the support-institution directory.
#[derive(Clone)]
pub struct InstitutionService {
    institutions: Arc<dyn InstitutionRepository>,
}

impl InstitutionService {
    #[must_use]
    pub fn new(institutions: Arc<dyn InstitutionRepository>) -> Self {
        Self { institutions }
    }

    /// Institutions ordered by name. `Some(true)` keeps paid services only,
    /// `Some(false)` free ones, `None` everything.
    ///
    /// # Errors
    ///
    /// Returns `InstitutionServiceError::Storage` if the directory cannot be read.
    pub async fn list(
        &self,
        paid: Option<bool>,
    ) -> Result<Vec<Institution>, InstitutionServiceError> {
        let institutions = self.institutions.list_institutions().await?;
        Ok(institutions
            .into_iter()
            .filter(|i| paid.is_none_or(|p| i.paid() == p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::model::{InstitutionDraft, InstitutionId};
    use storage::repository::InMemoryRepository;

    async fn seeded() -> InstitutionService {
        let repo = InMemoryRepository::new();
        for (id, name, paid) in [
            (1, "Recovery Clinic", true),
            (2, "Helpline", false),
            (3, "Legal Aid", false),
        ] {
            let institution = InstitutionDraft {
                paid,
                ..InstitutionDraft::new(name)
            }
            .validate(InstitutionId::new(id))
            .unwrap();
            repo.upsert_institution(&institution).await.unwrap();
        }
        InstitutionService::new(Arc::new(repo))
    }

    fn names(institutions: &[Institution]) -> Vec<&str> {
        institutions.iter().map(Institution::name).collect()
    }

    #[tokio::test]
    async fn lists_everything_by_default() {
        let service = seeded().await;
        let all = service.list(None).await.unwrap();
        assert_eq!(names(&all), vec!["Helpline", "Legal Aid", "Recovery Clinic"]);
    }

    #[tokio::test]
    async fn filters_free_and_paid() {
        let service = seeded().await;
        let free = service.list(Some(false)).await.unwrap();
        assert_eq!(names(&free), vec!["Helpline", "Legal Aid"]);

        let paid = service.list(Some(true)).await.unwrap();
        assert_eq!(names(&paid), vec!["Recovery Clinic"]);
    }

    #[tokio::test]
    async fn empty_directory_is_not_an_error() {
        let service = InstitutionService::new(Arc::new(InMemoryRepository::new()));
        assert!(service.list(None).await.unwrap().is_empty());
    }
}
