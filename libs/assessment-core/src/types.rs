//! Core types for the assessment engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use uuid::Uuid;

/// Top-level exam axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Track {
    Functional,
    Behavioral,
    Integrity,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::Functional, Track::Behavioral, Track::Integrity];

    /// Get the track name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Functional => "FUNCTIONAL",
            Self::Behavioral => "BEHAVIORAL",
            Self::Integrity => "INTEGRITY",
        }
    }

    /// Parse from string.
    ///
    /// Accepts the canonical names in any case, plus the labels used by
    /// legacy question banks (`FUNCIONAL`, `COMPORTAMENTAL`, `INTEGRIDAD`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FUNCTIONAL" | "FUNCIONAL" => Some(Self::Functional),
            "BEHAVIORAL" | "BEHAVIOURAL" | "COMPORTAMENTAL" => Some(Self::Behavioral),
            "INTEGRITY" | "INTEGRIDAD" => Some(Self::Integrity),
            _ => None,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key identifying a skill: one (track, competency, topic) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillKey {
    pub track: Track,
    pub competency: String,
    pub topic: String,
}

impl SkillKey {
    pub fn new(track: Track, competency: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            track,
            competency: competency.into(),
            topic: topic.into(),
        }
    }
}

/// Per-skill proficiency record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(flatten)]
    pub key: SkillKey,
    /// Proficiency estimate, always within [0, 100].
    pub mastery_score: f64,
    /// Review escalation factor, never below 1.0.
    pub priority_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Skill {
    pub const INITIAL_MASTERY: f64 = 0.0;
    pub const INITIAL_PRIORITY: f64 = 1.0;

    /// Fresh skill record, as created on the first attempt touching `key`.
    pub fn new(key: SkillKey) -> Self {
        Self {
            key,
            mastery_score: Self::INITIAL_MASTERY,
            priority_weight: Self::INITIAL_PRIORITY,
            last_seen: None,
        }
    }
}

/// Skills indexed by key, as consumed by the selector.
pub type SkillMap = HashMap<SkillKey, Skill>;

/// A validated, fingerprinted exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub track: Track,
    pub competency: String,
    pub topic: String,
    pub difficulty: u8,
    pub stem: String,
    /// Option key (`A`..`D`) to option text; three or four entries.
    pub options: BTreeMap<String, String>,
    pub correct_key: String,
    pub rationale: String,
    /// SHA-256 of the normalized stem; unique across the bank.
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn skill_key(&self) -> SkillKey {
        SkillKey::new(self.track, self.competency.clone(), self.topic.clone())
    }

    pub fn is_correct(&self, chosen_key: &str) -> bool {
        chosen_key.trim().eq_ignore_ascii_case(&self.correct_key)
    }
}

/// Question as submitted for import or manual entry, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub track: String,
    pub competency: String,
    pub topic: String,
    #[serde(default)]
    pub difficulty: Option<u8>,
    pub stem: String,
    pub options: BTreeMap<String, String>,
    pub correct_key: String,
    #[serde(default)]
    pub rationale: String,
}

/// One answered question, append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub chosen_key: String,
    pub is_correct: bool,
    pub mastery_before: f64,
    pub mastery_after: f64,
    pub created_at: DateTime<Utc>,
}

/// Unlockable achievements. Each is granted at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstSession,
    ThreeDayStreak,
    SevenDayStreak,
    PerfectSession,
    Veteran,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::FirstSession,
        Achievement::ThreeDayStreak,
        Achievement::SevenDayStreak,
        Achievement::PerfectSession,
        Achievement::Veteran,
    ];

    /// Stable identifier used for storage.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FirstSession => "first_session",
            Self::ThreeDayStreak => "three_day_streak",
            Self::SevenDayStreak => "seven_day_streak",
            Self::PerfectSession => "perfect_session",
            Self::Veteran => "veteran",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstSession => "First Step",
            Self::ThreeDayStreak => "Consistency",
            Self::SevenDayStreak => "Unstoppable",
            Self::PerfectSession => "Perfection",
            Self::Veteran => "Veteran",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstSession => "Completed your first session.",
            Self::ThreeDayStreak => "Studied three days in a row.",
            Self::SevenDayStreak => "Studied a full week in a row.",
            Self::PerfectSession => "Perfect score on a session of at least 10 questions.",
            Self::Veteran => "Reached the Senior Auditor rank.",
        }
    }
}

/// Gamification state for the single user context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub current_streak: u32,
    pub max_streak: u32,
    pub total_points: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    pub achievements: BTreeSet<Achievement>,
}

/// Correct/total count for one track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    pub fn new(correct: u32, total: u32) -> Self {
        Self { correct, total }
    }

    /// Fraction answered correctly, or `None` when the track was not asked.
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }
}

/// Per-track tallies for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTallies {
    pub functional: Tally,
    pub behavioral: Tally,
    pub integrity: Tally,
}

impl TrackTallies {
    pub fn get(&self, track: Track) -> Tally {
        match track {
            Track::Functional => self.functional,
            Track::Behavioral => self.behavioral,
            Track::Integrity => self.integrity,
        }
    }

    pub fn set(&mut self, track: Track, tally: Tally) {
        match track {
            Track::Functional => self.functional = tally,
            Track::Behavioral => self.behavioral = tally,
            Track::Integrity => self.integrity = tally,
        }
    }

    pub fn record(&mut self, track: Track, is_correct: bool) {
        let slot = match track {
            Track::Functional => &mut self.functional,
            Track::Behavioral => &mut self.behavioral,
            Track::Integrity => &mut self.integrity,
        };
        slot.total += 1;
        if is_correct {
            slot.correct += 1;
        }
    }

    pub fn correct(&self) -> u32 {
        Track::ALL.iter().map(|t| self.get(*t).correct).sum()
    }

    pub fn total(&self) -> u32 {
        Track::ALL.iter().map(|t| self.get(*t).total).sum()
    }
}

/// Result of finalizing one session. Not persisted as an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub tallies: TrackTallies,
    pub composite: f64,
    pub passed: bool,
    pub points_earned: u64,
    pub current_streak: u32,
    pub total_points: u64,
    pub rank: String,
    pub rank_changed: bool,
    pub new_achievements: Vec<Achievement>,
}
