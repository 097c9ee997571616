use std::sync::Arc;

use crate::{
    errors::AppResult,
    repositories::{ResultRepository, UserRepository},
};

pub const COMPLETION_XP: i64 = 200;
pub const EXCELLENCE_XP: i64 = 50;
pub const EXCELLENCE_THRESHOLD: f64 = 90.0;
pub const EXCELLENCE_BADGE: &str = "Gold Student";
pub const VETERAN_BADGE: &str = "Quiz Master";
pub const VETERAN_ATTEMPTS: u64 = 20;

/// Grants XP and badges after a scored submission. Callers treat the whole
/// thing as best-effort; the submission is already persisted by the time
/// this runs.
pub struct RewardService {
    user_repository: Arc<dyn UserRepository>,
    result_repository: Arc<dyn ResultRepository>,
}

impl RewardService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        result_repository: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            user_repository,
            result_repository,
        }
    }

    /// Apply the grants earned by one submission. A user that cannot be
    /// resolved is logged and skipped.
    pub async fn award_for_submission(&self, user_id: &str, percent: f64) -> AppResult<()> {
        let user = match self.user_repository.find_by_id(user_id).await? {
            Some(user) => Some(user),
            None => self.user_repository.find_by_username(user_id).await?,
        };

        let Some(user) = user else {
            log::warn!("Skipping rewards: no user found for '{}'", user_id);
            return Ok(());
        };

        // The submission that triggered this call is already persisted, so
        // the count includes it.
        let attempts = self.result_repository.count_by_user(user_id).await?;
        let (xp_gain, badges) = grants_for(percent, attempts);

        self.user_repository
            .apply_reward(&user, xp_gain, &badges)
            .await?;

        log::info!(
            "Awarded {} XP to '{}' (badges: {:?})",
            xp_gain,
            user.username,
            badges
        );

        Ok(())
    }
}

fn grants_for(percent: f64, attempts: u64) -> (i64, Vec<String>) {
    let mut xp_gain = COMPLETION_XP;
    let mut badges = Vec::new();

    if percent >= EXCELLENCE_THRESHOLD {
        xp_gain += EXCELLENCE_XP;
        badges.push(EXCELLENCE_BADGE.to_string());
    }

    if attempts >= VETERAN_ATTEMPTS {
        badges.push(VETERAN_BADGE.to_string());
    }

    (xp_gain, badges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_alone_grants_base_xp() {
        let (xp, badges) = grants_for(50.0, 1);

        assert_eq!(xp, COMPLETION_XP);
        assert!(badges.is_empty());
    }

    #[test]
    fn test_ninety_percent_grants_excellence() {
        let (xp, badges) = grants_for(90.0, 1);

        assert_eq!(xp, COMPLETION_XP + EXCELLENCE_XP);
        assert_eq!(badges, vec![EXCELLENCE_BADGE.to_string()]);
    }

    #[test]
    fn test_eighty_nine_percent_grants_no_excellence() {
        let (xp, badges) = grants_for(89.0, 1);

        assert_eq!(xp, COMPLETION_XP);
        assert!(badges.is_empty());
    }

    #[test]
    fn test_twentieth_attempt_grants_veteran_badge() {
        let (_, badges) = grants_for(0.0, VETERAN_ATTEMPTS);

        assert_eq!(badges, vec![VETERAN_BADGE.to_string()]);
    }

    #[test]
    fn test_nineteenth_attempt_grants_no_veteran_badge() {
        let (_, badges) = grants_for(0.0, VETERAN_ATTEMPTS - 1);

        assert!(badges.is_empty());
    }

    #[test]
    fn test_both_badges_can_land_together() {
        let (xp, badges) = grants_for(100.0, 25);

        assert_eq!(xp, COMPLETION_XP + EXCELLENCE_XP);
        assert_eq!(
            badges,
            vec![EXCELLENCE_BADGE.to_string(), VETERAN_BADGE.to_string()]
        );
    }
}
