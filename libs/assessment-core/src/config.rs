//! Engine configuration.

use crate::dedupe::{DuplicateDetector, DEFAULT_LIMIT, DEFAULT_THRESHOLD};
use crate::error::{AssessmentError, Result};
use crate::gamification::{GamificationConfig, GamificationEngine};
use crate::mastery::MasteryTracker;
use crate::scoring::CompositeScorer;
use crate::selector::AdaptiveSelector;
use serde::{Deserialize, Serialize};

/// Fuzzy duplicate detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateSettings {
    pub threshold: f64,
    pub limit: usize,
}

impl Default for DuplicateSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// All tunable engine parameters. Every field has a default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selection: AdaptiveSelector,
    pub scoring: CompositeScorer,
    pub gamification: GamificationConfig,
    pub duplicates: DuplicateSettings,
    pub mastery: MasteryTracker,
}

impl EngineConfig {
    /// Check ranges that would make the engine misbehave.
    pub fn validate(&self) -> Result<()> {
        let s = &self.selection;
        if !(0.0..=100.0).contains(&s.weak_below) || s.strong_from < s.weak_below || s.strong_from > 100.0 {
            return Err(AssessmentError::InvalidConfig(format!(
                "tier bounds must satisfy 0 <= weak_below ({}) <= strong_from ({}) <= 100",
                s.weak_below, s.strong_from
            )));
        }
        if s.weak_share < 0.0 || s.medium_share < 0.0 || s.weak_share + s.medium_share > 1.0 {
            return Err(AssessmentError::InvalidConfig(format!(
                "tier shares must be non-negative and sum to at most 1 (weak {}, medium {})",
                s.weak_share, s.medium_share
            )));
        }
        if !(0.0..=1.0).contains(&self.scoring.eliminatory_ratio) {
            return Err(AssessmentError::InvalidConfig(format!(
                "eliminatory_ratio must be within [0, 1], got {}",
                self.scoring.eliminatory_ratio
            )));
        }
        if self.gamification.daily_reset_hour > 23 {
            return Err(AssessmentError::InvalidConfig(format!(
                "daily_reset_hour must be 0-23, got {}",
                self.gamification.daily_reset_hour
            )));
        }
        if !(0.0..=100.0).contains(&self.duplicates.threshold) {
            return Err(AssessmentError::InvalidConfig(format!(
                "duplicate threshold must be within [0, 100], got {}",
                self.duplicates.threshold
            )));
        }
        if self.mastery.priority_floor < 1.0 {
            return Err(AssessmentError::InvalidConfig(format!(
                "priority_floor must be at least 1.0, got {}",
                self.mastery.priority_floor
            )));
        }
        Ok(())
    }

    pub fn duplicate_detector(&self) -> DuplicateDetector {
        DuplicateDetector::new(self.duplicates.threshold).with_limit(self.duplicates.limit)
    }

    pub fn gamification_engine(&self) -> GamificationEngine {
        GamificationEngine::new(self.scoring, self.gamification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::MissingFunctionalPolicy;
    use crate::selector::SelectionStrategy;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{
            "selection": { "strategy": "priority_weighted" },
            "scoring": { "missing_functional": "fail" },
            "gamification": { "daily_reset_hour": 4 }
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.selection.strategy, SelectionStrategy::PriorityWeighted);
        assert_eq!(config.selection.weak_share, 0.60);
        assert_eq!(config.scoring.missing_functional, MissingFunctionalPolicy::Fail);
        assert_eq!(config.scoring.weights.functional, 60.0);
        assert_eq!(config.gamification.daily_reset_hour, 4);
        assert_eq!(config.duplicates.threshold, 90.0);
    }

    #[test]
    fn rejects_shares_above_one() {
        let mut config = EngineConfig::default();
        config.selection.weak_share = 0.8;
        assert!(matches!(config.validate(), Err(AssessmentError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_reset_hour_out_of_range() {
        let mut config = EngineConfig::default();
        config.gamification.daily_reset_hour = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn builds_detector_from_settings() {
        let mut config = EngineConfig::default();
        config.duplicates.limit = 2;
        let detector = config.duplicate_detector();
        assert_eq!(detector.limit, 2);
        assert_eq!(detector.threshold, 90.0);
    }
}
