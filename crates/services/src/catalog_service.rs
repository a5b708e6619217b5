use std::sync::Arc;

use civic_core::model::{Category, Module, ModuleId, Question, QuestionId, QuestionProblem};
use storage::repository::CatalogRepository;

use crate::error::CatalogServiceError;

/// A stored question with content problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionIssue {
    pub module_id: ModuleId,
    pub question_id: QuestionId,
    pub correct_answer: String,
    pub problems: Vec<QuestionProblem>,
}

/// Read-side access to the module catalog.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Modules sorted by category then id, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the catalog cannot be read.
    pub async fn list_modules(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Module>, CatalogServiceError> {
        let mut modules: Vec<Module> = self
            .catalog
            .list_modules()
            .await?
            .into_iter()
            .filter(|m| category.is_none_or(|c| m.category() == c))
            .collect();
        modules.sort_by_key(Module::catalog_key);
        Ok(modules)
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::ModuleNotFound` if missing, or storage errors.
    pub async fn get_module(&self, id: ModuleId) -> Result<Module, CatalogServiceError> {
        self.catalog
            .get_module(id)
            .await?
            .ok_or(CatalogServiceError::ModuleNotFound(id))
    }

    /// Questions with blank text, no options, or a correct answer that can
    /// never be picked.
    ///
    /// Meant to run when content is ingested. Scoring is unaffected: such
    /// questions still load and count towards the total.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the catalog cannot be read.
    pub async fn audit_questions(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<QuestionIssue>, CatalogServiceError> {
        let questions = self.catalog.questions_for_module(module_id).await?;
        Ok(find_issues(&questions))
    }

    /// `audit_questions` over every module in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the catalog cannot be read.
    pub async fn audit_catalog(&self) -> Result<Vec<QuestionIssue>, CatalogServiceError> {
        let mut issues = Vec::new();
        for module in self.list_modules(None).await? {
            issues.extend(self.audit_questions(module.id()).await?);
        }
        Ok(issues)
    }
}

fn find_issues(questions: &[Question]) -> Vec<QuestionIssue> {
    questions
        .iter()
        .filter_map(|q| {
            let problems = q.problems();
            if problems.is_empty() {
                return None;
            }
            log::warn!(
                "question {} in module {} has content problems: {problems:?}",
                q.id(),
                q.module_id()
            );
            Some(QuestionIssue {
                module_id: q.module_id(),
                question_id: q.id(),
                correct_answer: q.correct_answer().to_owned(),
                problems,
            })
        })
        .collect()
}
