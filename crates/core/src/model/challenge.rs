use chrono::{Datelike, NaiveDate};

/// A short daily wellbeing activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration_minutes: u32,
}

impl Challenge {
    #[must_use]
    pub fn new(
        id: u32,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            duration_minutes,
        }
    }
}

/// Built-in rotation of challenges.
#[must_use]
pub fn default_challenges() -> Vec<Challenge> {
    vec![
        Challenge::new(
            1,
            "Practice Deep Breathing",
            "Take 5 minutes to practice deep breathing exercises. Inhale for 4 counts, hold for 4, exhale for 6.",
            "Mindfulness",
            5,
        ),
        Challenge::new(
            2,
            "Write Three Gratitudes",
            "Write down three things you're grateful for today, no matter how small they might seem.",
            "Gratitude",
            3,
        ),
        Challenge::new(
            3,
            "Take a Mindful Walk",
            "Step outside and take a 10-minute walk, focusing on your surroundings and breathing.",
            "Movement",
            10,
        ),
        Challenge::new(
            4,
            "Connect with Someone",
            "Reach out to a friend or family member you haven't spoken to in a while.",
            "Connection",
            15,
        ),
        Challenge::new(
            5,
            "Practice Self-Compassion",
            "Speak to yourself with the same kindness you would show a good friend.",
            "Self-Care",
            5,
        ),
    ]
}

/// Picks the challenge for `date`: day of year (Jan 1 = 1) modulo the list length.
#[must_use]
pub fn challenge_for_day(challenges: &[Challenge], date: NaiveDate) -> Option<&Challenge> {
    if challenges.is_empty() {
        return None;
    }
    let index = date.ordinal() as usize % challenges.len();
    challenges.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rotates_by_day_of_year() {
        let challenges = default_challenges();
        // Jan 1 is ordinal 1 -> index 1.
        assert_eq!(challenge_for_day(&challenges, date(2024, 1, 1)).unwrap().id, 2);
        assert_eq!(challenge_for_day(&challenges, date(2024, 1, 5)).unwrap().id, 1);
        assert_eq!(challenge_for_day(&challenges, date(2024, 1, 6)).unwrap().id, 2);
    }

    #[test]
    fn same_day_always_yields_same_challenge() {
        let challenges = default_challenges();
        let a = challenge_for_day(&challenges, date(2025, 7, 14));
        let b = challenge_for_day(&challenges, date(2025, 7, 14));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_rotation_has_no_challenge() {
        assert!(challenge_for_day(&[], date(2024, 3, 1)).is_none());
    }
}
