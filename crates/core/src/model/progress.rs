use chrono::{DateTime, Utc};

use crate::model::ids::{ModuleId, UserId};

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Durable completion marker for one (user, module) pair.
///
/// `completed_at` is `Some` exactly when `completed` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub module_id: ModuleId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// A record in the `Completed` state, stamped at `at`.
    #[must_use]
    pub fn completed(user_id: UserId, module_id: ModuleId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            module_id,
            completed: true,
            completed_at: Some(at),
        }
    }

    /// Result of a manual completion toggle applied to `current`.
    ///
    /// - no record: becomes completed at `now`
    /// - completed: flips to not completed, timestamp cleared
    /// - not completed: flips to completed at `now`
    #[must_use]
    pub fn toggled(
        current: Option<&ProgressRecord>,
        user_id: UserId,
        module_id: ModuleId,
        now: DateTime<Utc>,
    ) -> Self {
        match current {
            Some(record) if record.completed => Self {
                user_id,
                module_id,
                completed: false,
                completed_at: None,
            },
            _ => Self::completed(user_id, module_id, now),
        }
    }

    #[must_use]
    pub fn status(&self) -> ModuleStatus {
        if self.completed {
            ModuleStatus::Completed
        } else {
            ModuleStatus::InProgress
        }
    }
}

//
// ─── MODULE STATUS ─────────────────────────────────────────────────────────────
//

/// Where a user stands on a module.
///
/// `NotStarted -> Completed` on a passing quiz, `mark_completed_no_quiz` or a
/// toggle. `Completed <-> InProgress` via toggles. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ModuleStatus {
    #[must_use]
    pub fn from_record(record: Option<&ProgressRecord>) -> Self {
        record.map_or(ModuleStatus::NotStarted, ProgressRecord::status)
    }

    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, ModuleStatus::Completed)
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Completed/total counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
}

impl ProgressSummary {
    /// Percentage rounded to two decimals (66.666… → 66.67).
    #[must_use]
    pub fn rounded_percentage(&self) -> f64 {
        (self.percentage * 100.0).round() / 100.0
    }

    /// Percentage rounded to a whole number, as shown next to progress bars.
    #[must_use]
    pub fn whole_percentage(&self) -> u32 {
        // Always within 0..=100 for consistent inputs; clamp guards stray records.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = self.percentage.round().clamp(0.0, 100.0) as u32;
        pct
    }
}

/// Counts completed records against the catalog size.
///
/// Returns a percentage of 0 when `total_modules` is 0.
#[must_use]
pub fn aggregate(records: &[ProgressRecord], total_modules: usize) -> ProgressSummary {
    let completed = records.iter().filter(|r| r.completed).count();
    let percentage = if total_modules > 0 {
        #[allow(clippy::cast_precision_loss)]
        let ratio = completed as f64 / total_modules as f64;
        ratio * 100.0
    } else {
        0.0
    };

    ProgressSummary {
        completed,
        total: total_modules,
        percentage,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn record(module: u64, completed: bool) -> ProgressRecord {
        ProgressRecord {
            user_id: UserId::random(),
            module_id: ModuleId::new(module),
            completed,
            completed_at: completed.then(fixed_now),
        }
    }

    #[test]
    fn missing_record_is_not_started() {
        assert_eq!(ModuleStatus::from_record(None), ModuleStatus::NotStarted);
    }

    #[test]
    fn status_follows_completion_flag() {
        assert_eq!(
            ModuleStatus::from_record(Some(&record(1, true))),
            ModuleStatus::Completed
        );
        assert_eq!(
            ModuleStatus::from_record(Some(&record(1, false))),
            ModuleStatus::InProgress
        );
    }

    #[test]
    fn toggle_without_record_completes() {
        let user = UserId::random();
        let next = ProgressRecord::toggled(None, user, ModuleId::new(4), fixed_now());
        assert!(next.completed);
        assert_eq!(next.completed_at, Some(fixed_now()));
    }

    #[test]
    fn toggle_twice_restores_flag() {
        let user = UserId::random();
        let module = ModuleId::new(4);
        let start = ProgressRecord::completed(user, module, fixed_now());

        let once = ProgressRecord::toggled(Some(&start), user, module, fixed_now());
        assert!(!once.completed);
        assert_eq!(once.completed_at, None);

        let later = fixed_now() + chrono::Duration::hours(1);
        let twice = ProgressRecord::toggled(Some(&once), user, module, later);
        assert!(twice.completed);
        assert_eq!(twice.completed_at, Some(later));
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        for n in [0, 1, 12] {
            let summary = aggregate(&[], n);
            assert_eq!(summary.completed, 0);
            assert_eq!(summary.percentage, 0.0);
        }
    }

    #[test]
    fn aggregate_with_empty_catalog_still_counts() {
        let records = [record(1, true), record(2, true), record(3, false)];
        let summary = aggregate(&records, 0);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.percentage, 0.0);
    }

    #[test]
    fn aggregate_two_of_three() {
        let records = [record(1, true), record(2, false), record(3, true)];
        let summary = aggregate(&records, 3);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.total, 3);
        assert!((summary.percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.rounded_percentage(), 66.67);
        assert_eq!(summary.whole_percentage(), 67);
    }
}
