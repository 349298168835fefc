//! Weighted, partially-eliminatory session scoring.

use crate::types::{Track, TrackTallies};
use serde::{Deserialize, Serialize};

/// Weight of each track in the composite (sums to 100 by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackWeights {
    pub functional: f64,
    pub behavioral: f64,
    pub integrity: f64,
}

impl Default for TrackWeights {
    fn default() -> Self {
        Self {
            functional: 60.0,
            behavioral: 20.0,
            integrity: 20.0,
        }
    }
}

impl TrackWeights {
    pub fn get(&self, track: Track) -> f64 {
        match track {
            Track::Functional => self.functional,
            Track::Behavioral => self.behavioral,
            Track::Integrity => self.integrity,
        }
    }
}

/// What happens to the eliminatory gate when no functional questions were
/// asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFunctionalPolicy {
    /// The gate is not applied and the session passes.
    #[default]
    AutoPass,
    /// A session without functional questions cannot pass.
    Fail,
}

impl MissingFunctionalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoPass => "auto_pass",
            Self::Fail => "fail",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto_pass" => Some(Self::AutoPass),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Composite scorer with configurable weights and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeScorer {
    pub weights: TrackWeights,
    /// Minimum functional ratio required to pass.
    pub eliminatory_ratio: f64,
    pub missing_functional: MissingFunctionalPolicy,
    pub points_per_composite: f64,
    /// Bonus points per streak day, applied when the streak exceeds one.
    pub streak_bonus: u64,
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self {
            weights: TrackWeights::default(),
            eliminatory_ratio: 0.70,
            missing_functional: MissingFunctionalPolicy::AutoPass,
            points_per_composite: 2.0,
            streak_bonus: 5,
        }
    }
}

/// Score of one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub composite: f64,
    pub passed: bool,
    pub points: u64,
}

impl CompositeScorer {
    /// Weighted sum of per-track ratios. A track with no questions
    /// contributes nothing.
    pub fn composite(&self, tallies: &TrackTallies) -> f64 {
        Track::ALL
            .iter()
            .map(|track| {
                let tally = tallies.get(*track);
                if tally.total == 0 {
                    0.0
                } else {
                    tally.correct as f64 * self.weights.get(*track) / tally.total as f64
                }
            })
            .sum()
    }

    /// Whether the functional track clears the eliminatory ratio.
    pub fn is_passed(&self, tallies: &TrackTallies) -> bool {
        match tallies.functional.ratio() {
            Some(ratio) => ratio >= self.eliminatory_ratio,
            None => self.missing_functional == MissingFunctionalPolicy::AutoPass,
        }
    }

    pub fn points(&self, composite: f64, current_streak: u32) -> u64 {
        let base = (composite * self.points_per_composite).round().max(0.0) as u64;
        if current_streak > 1 {
            base + u64::from(current_streak) * self.streak_bonus
        } else {
            base
        }
    }

    pub fn score(&self, tallies: &TrackTallies, current_streak: u32) -> ScoreCard {
        let composite = self.composite(tallies);
        ScoreCard {
            composite,
            passed: self.is_passed(tallies),
            points: self.points(composite, current_streak),
        }
    }
}
