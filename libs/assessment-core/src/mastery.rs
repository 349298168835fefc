//! Per-skill proficiency and review-priority updates.
//!
//! Correct answers grow mastery along a diminishing-returns curve toward 100;
//! incorrect answers apply a flat penalty that outweighs a typical gain.
//! Priority escalates on every miss and relaxes slowly on success.

use crate::types::Skill;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MASTERY_MIN: f64 = 0.0;
pub const MASTERY_MAX: f64 = 100.0;

/// Mastery tracker with configurable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryTracker {
    /// Gain applied at zero mastery; scaled by the remaining headroom.
    pub gain_rate: f64,
    /// Flat mastery loss on a miss.
    pub penalty: f64,
    /// Priority added on a miss.
    pub priority_escalation: f64,
    /// Priority removed on a hit.
    pub priority_relief: f64,
    pub priority_floor: f64,
}

impl Default for MasteryTracker {
    fn default() -> Self {
        Self {
            gain_rate: 5.0,
            penalty: 10.0,
            priority_escalation: 2.0,
            priority_relief: 0.5,
            priority_floor: 1.0,
        }
    }
}

/// Skill state before and after one answer.
#[derive(Debug, Clone)]
pub struct MasteryUpdate {
    pub before: Skill,
    pub after: Skill,
}

impl MasteryTracker {
    pub fn update_mastery(&self, is_correct: bool, current: f64) -> f64 {
        let current = current.clamp(MASTERY_MIN, MASTERY_MAX);
        if is_correct {
            let delta = self.gain_rate * (MASTERY_MAX - current) / MASTERY_MAX;
            (current + delta).min(MASTERY_MAX)
        } else {
            (current - self.penalty).max(MASTERY_MIN)
        }
    }

    pub fn update_priority(&self, current: f64, is_correct: bool) -> f64 {
        if is_correct {
            (current - self.priority_relief).max(self.priority_floor)
        } else {
            current + self.priority_escalation
        }
    }

    /// Apply one answer to a skill record.
    pub fn apply(&self, skill: &Skill, is_correct: bool, now: DateTime<Utc>) -> MasteryUpdate {
        let after = Skill {
            key: skill.key.clone(),
            mastery_score: self.update_mastery(is_correct, skill.mastery_score),
            priority_weight: self.update_priority(skill.priority_weight, is_correct),
            last_seen: Some(now),
        };
        MasteryUpdate {
            before: skill.clone(),
            after,
        }
    }
}

/// [`MasteryTracker::update_mastery`] with default parameters.
pub fn update_mastery(is_correct: bool, current: f64) -> f64 {
    MasteryTracker::default().update_mastery(is_correct, current)
}

/// [`MasteryTracker::update_priority`] with default parameters.
pub fn update_priority(current: f64, is_correct: bool) -> f64 {
    MasteryTracker::default().update_priority(current, is_correct)
}
