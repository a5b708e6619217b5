use chrono::{DateTime, Utc};
use civic_core::model::{Category, Module, ModuleStatus, ProgressRecord, ProgressSummary};

/// One module as shown in the module list, with the user's status on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOverview {
    pub module: Module,
    pub status: ModuleStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Everything the dashboard needs: the module list and the overall progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub modules: Vec<ModuleOverview>,
    pub summary: ProgressSummary,
}

impl Dashboard {
    /// Joins modules with the user's records. Modules come out sorted by
    /// category name, then id.
    #[must_use]
    pub fn build(mut modules: Vec<Module>, records: &[ProgressRecord]) -> Self {
        modules.sort_by_key(Module::catalog_key);

        let summary = civic_core::model::aggregate(records, modules.len());
        let modules = modules
            .into_iter()
            .map(|module| {
                let record = records.iter().find(|r| r.module_id == module.id());
                ModuleOverview {
                    status: ModuleStatus::from_record(record),
                    completed_at: record.and_then(|r| r.completed_at),
                    module,
                }
            })
            .collect();

        Self { modules, summary }
    }

    /// Modules in `category`, or all of them for `None`.
    #[must_use]
    pub fn filter(&self, category: Option<Category>) -> Vec<&ModuleOverview> {
        self.modules
            .iter()
            .filter(|m| category.is_none_or(|c| m.module.category() == c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::model::{ModuleId, UserId};
    use civic_core::time::fixed_now;

    fn module(id: u64, category: Category) -> Module {
        Module::new(ModuleId::new(id), category, "beginner", format!("M{id}"), "").unwrap()
    }

    #[test]
    fn sorts_by_category_and_joins_status() {
        let user = UserId::random();
        let modules = vec![
            module(1, Category::Mental),
            module(2, Category::Civic),
            module(3, Category::Drugs),
        ];
        let records = vec![
            ProgressRecord::completed(user, ModuleId::new(1), fixed_now()),
            ProgressRecord {
                user_id: user,
                module_id: ModuleId::new(3),
                completed: false,
                completed_at: None,
            },
        ];

        let dashboard = Dashboard::build(modules, &records);
        let order: Vec<u64> = dashboard
            .modules
            .iter()
            .map(|m| m.module.id().value())
            .collect();
        assert_eq!(order, vec![2, 3, 1]);

        assert_eq!(dashboard.modules[0].status, ModuleStatus::NotStarted);
        assert_eq!(dashboard.modules[1].status, ModuleStatus::InProgress);
        assert_eq!(dashboard.modules[2].status, ModuleStatus::Completed);
        assert_eq!(dashboard.modules[2].completed_at, Some(fixed_now()));

        assert_eq!(dashboard.summary.completed, 1);
        assert_eq!(dashboard.summary.total, 3);
    }

    #[test]
    fn filter_by_category() {
        let dashboard = Dashboard::build(
            vec![
                module(1, Category::Civic),
                module(2, Category::Mental),
                module(3, Category::Civic),
            ],
            &[],
        );
        assert_eq!(dashboard.filter(None).len(), 3);
        assert_eq!(dashboard.filter(Some(Category::Civic)).len(), 2);
        assert!(dashboard.filter(Some(Category::Drugs)).is_empty());
    }
}
