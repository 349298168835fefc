//! Adaptive assessment engine shared by the store and the HTTP service.
//!
//! Provides:
//! - Text normalization and fingerprinting for question stems
//! - Near-duplicate detection (token-sort similarity)
//! - Per-skill mastery and priority updates
//! - Adaptive question selection biased toward weak skills
//! - Weighted, partially-eliminatory session scoring
//! - Streak, points, rank and achievement transitions
//! - Shared types (Question, Skill, Attempt, UserStats, ExamSession, etc.)

pub mod config;
pub mod dedupe;
pub mod error;
pub mod gamification;
pub mod mastery;
pub mod normalize;
pub mod question;
pub mod rank;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod types;

pub use config::{DuplicateSettings, EngineConfig};
pub use dedupe::{fingerprint, find_similar, Corpus, DuplicateDetector, DuplicateReport, SimilarMatch, TokenSimilarity};
pub use error::{AssessmentError, Result};
pub use gamification::{study_day, GamificationConfig, GamificationEngine, GamificationUpdate};
pub use mastery::{update_mastery, update_priority, MasteryTracker};
pub use normalize::normalize;
pub use rank::{rank_for, Rank, RankProgress, RANKS};
pub use scoring::{CompositeScorer, MissingFunctionalPolicy, ScoreCard, TrackWeights};
pub use selector::{AdaptiveSelector, SelectionStrategy, Tier};
pub use session::{ExamSession, GradedAnswer, UNANSWERED_KEY};
pub use types::{
    Achievement, Attempt, NewQuestion, Question, SessionOutcome, Skill, SkillKey, SkillMap, Tally, Track,
    TrackTallies, UserStats,
};
