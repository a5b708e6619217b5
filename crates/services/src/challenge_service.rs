use std::sync::Arc;

use chrono::NaiveDate;
use civic_core::model::{Challenge, UserId, challenge_for_day, default_challenges};
use civic_core::time::Clock;
use storage::repository::ChallengeRepository;

use crate::error::ChallengeServiceError;

/// Today's challenge and whether the user already did it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyChallenge {
    pub challenge: Challenge,
    pub date: NaiveDate,
    pub completed: bool,
}

/// Daily mental-health challenge for one user.
#[derive(Clone)]
pub struct ChallengeService {
    clock: Clock,
    user_id: UserId,
    challenges: Vec<Challenge>,
    completions: Arc<dyn ChallengeRepository>,
}

impl ChallengeService {
    /// Uses the built-in challenge rotation.
    #[must_use]
    pub fn new(clock: Clock, user_id: UserId, completions: Arc<dyn ChallengeRepository>) -> Self {
        Self::with_challenges(clock, user_id, default_challenges(), completions)
    }

    #[must_use]
    pub fn with_challenges(
        clock: Clock,
        user_id: UserId,
        challenges: Vec<Challenge>,
        completions: Arc<dyn ChallengeRepository>,
    ) -> Self {
        Self {
            clock,
            user_id,
            challenges,
            completions,
        }
    }

    /// # Errors
    ///
    /// Returns `ChallengeServiceError::Empty` if the rotation is empty, or storage errors.
    pub async fn today(&self) -> Result<DailyChallenge, ChallengeServiceError> {
        let date = self.clock.today();
        let challenge = challenge_for_day(&self.challenges, date)
            .ok_or(ChallengeServiceError::Empty)?
            .clone();
        let completed = self
            .completions
            .is_challenge_completed(self.user_id, date)
            .await?;

        Ok(DailyChallenge {
            challenge,
            date,
            completed,
        })
    }

    /// Marks today's challenge done. Repeating it the same day is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeServiceError::Empty` if the rotation is empty, or storage errors.
    pub async fn complete_today(&self) -> Result<DailyChallenge, ChallengeServiceError> {
        let mut today = self.today().await?;
        if !today.completed {
            self.completions
                .mark_challenge_completed(self.user_id, today.date)
                .await?;
            log::info!(
                "user {} completed challenge {} on {}",
                self.user_id,
                today.challenge.id,
                today.date
            );
            today.completed = true;
        }
        Ok(today)
    }
}
