use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::ModuleId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("unknown module category: {0}")]
    UnknownCategory(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Topic area a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Civic,
    Mental,
    Drugs,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Civic, Category::Mental, Category::Drugs];

    /// Parses the stored form (`civic`, `mental`, `drugs`).
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::UnknownCategory` for anything else.
    pub fn parse(raw: &str) -> Result<Self, ModuleError> {
        match raw.trim() {
            "civic" => Ok(Self::Civic),
            "mental" => Ok(Self::Mental),
            "drugs" => Ok(Self::Drugs),
            other => Err(ModuleError::UnknownCategory(other.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Civic => "civic",
            Category::Mental => "mental",
            Category::Drugs => "drugs",
        }
    }

    /// Human-facing name used on badges and filters.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Civic => "Civic Rights",
            Category::Mental => "Mental Health",
            Category::Drugs => "Drug Awareness",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// A unit of educational content. Read-only from the tracker's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    category: Category,
    level: String,
    title: String,
    content: String,
}

impl Module {
    /// Creates a module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::EmptyTitle` if the title is blank.
    pub fn new(
        id: ModuleId,
        category: Category,
        level: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, ModuleError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModuleError::EmptyTitle);
        }

        Ok(Self {
            id,
            category,
            level: level.into(),
            title,
            content: content.into(),
        })
    }

    /// Rehydrate a module from storage without validating it.
    ///
    /// Content problems in stored rows are reported by the catalog audit rather
    /// than hiding the module from every reader.
    #[must_use]
    pub fn from_persisted(
        id: ModuleId,
        category: Category,
        level: String,
        title: String,
        content: String,
    ) -> Self {
        Self {
            id,
            category,
            level,
            title,
            content,
        }
    }

    /// Sort key for module lists: category name, then id.
    #[must_use]
    pub fn catalog_key(&self) -> (&'static str, ModuleId) {
        (self.category.as_str(), self.id)
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Free-text difficulty label ("beginner", "intermediate", ...).
    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = Category::parse("sports").unwrap_err();
        assert_eq!(err, ModuleError::UnknownCategory("sports".into()));
    }

    #[test]
    fn labels_match_dashboard_badges() {
        assert_eq!(Category::Civic.label(), "Civic Rights");
        assert_eq!(Category::Mental.label(), "Mental Health");
        assert_eq!(Category::Drugs.label(), "Drug Awareness");
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = Module::new(ModuleId::new(1), Category::Civic, "beginner", "  ", "body")
            .unwrap_err();
        assert_eq!(err, ModuleError::EmptyTitle);
    }

    #[test]
    fn persisted_modules_skip_validation() {
        let module = Module::from_persisted(
            ModuleId::new(9),
            Category::Drugs,
            String::new(),
            String::new(),
            String::new(),
        );
        assert_eq!(module.title(), "");
    }

    #[test]
    fn catalog_key_orders_by_category_then_id() {
        let mut modules = vec![
            Module::new(ModuleId::new(1), Category::Mental, "", "a", "").unwrap(),
            Module::new(ModuleId::new(4), Category::Civic, "", "b", "").unwrap(),
            Module::new(ModuleId::new(2), Category::Civic, "", "c", "").unwrap(),
            Module::new(ModuleId::new(3), Category::Drugs, "", "d", "").unwrap(),
        ];
        modules.sort_by_key(Module::catalog_key);
        let ids: Vec<u64> = modules.iter().map(|m| m.id().value()).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn accessors_return_fields() {
        let module = Module::new(
            ModuleId::new(3),
            Category::Mental,
            "intermediate",
            "Coping with stress",
            "Breathing helps.",
        )
        .unwrap();
        assert_eq!(module.id(), ModuleId::new(3));
        assert_eq!(module.category(), Category::Mental);
        assert_eq!(module.level(), "intermediate");
        assert_eq!(module.title(), "Coping with stress");
        assert_eq!(module.content(), "Breathing helps.");
    }
}
