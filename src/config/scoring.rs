//! Scoring constants

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::metrics::ScorePolicy;

/// Points awarded and deducted for goal transitions.
///
/// Converted once at startup into an immutable [`ScorePolicy`].
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_easy")]
    pub easy_goal_score: i64,

    #[serde(default = "default_moderate")]
    pub moderate_goal_score: i64,

    #[serde(default = "default_extreme")]
    pub extreme_goal_score: i64,

    #[serde(default = "default_adjustment")]
    pub defer_penalty: i64,

    #[serde(default = "default_adjustment")]
    pub resume_bonus: i64,
}

impl ScoringConfig {
    pub fn policy(&self) -> ScorePolicy {
        ScorePolicy {
            easy_goal_score: self.easy_goal_score,
            moderate_goal_score: self.moderate_goal_score,
            extreme_goal_score: self.extreme_goal_score,
            defer_penalty: self.defer_penalty,
            resume_bonus: self.resume_bonus,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let bases = [
            ("easy_goal_score", self.easy_goal_score),
            ("moderate_goal_score", self.moderate_goal_score),
            ("extreme_goal_score", self.extreme_goal_score),
        ];
        if let Some((name, _)) = bases.iter().find(|(_, v)| *v <= 0) {
            return Err(ValidationError::NonPositiveScore(*name));
        }
        if self.defer_penalty < 0 {
            return Err(ValidationError::NegativeAdjustment("defer_penalty"));
        }
        if self.resume_bonus < 0 {
            return Err(ValidationError::NegativeAdjustment("resume_bonus"));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            easy_goal_score: default_easy(),
            moderate_goal_score: default_moderate(),
            extreme_goal_score: default_extreme(),
            defer_penalty: default_adjustment(),
            resume_bonus: default_adjustment(),
        }
    }
}

fn default_easy() -> i64 {
    10
}

fn default_moderate() -> i64 {
    20
}

fn default_extreme() -> i64 {
    30
}

fn default_adjustment() -> i64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_defaults() {
        assert_eq!(ScoringConfig::default().policy(), ScorePolicy::default());
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_base_score_is_rejected() {
        let config = ScoringConfig {
            moderate_goal_score: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::NonPositiveScore("moderate_goal_score"))
        );
    }

    #[test]
    fn negative_adjustments_are_rejected() {
        let config = ScoringConfig {
            defer_penalty: -1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::NegativeAdjustment("defer_penalty")));

        let config = ScoringConfig {
            resume_bonus: -1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::NegativeAdjustment("resume_bonus")));
    }

    #[test]
    fn zero_penalty_is_allowed() {
        let config = ScoringConfig {
            defer_penalty: 0,
            resume_bonus: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
