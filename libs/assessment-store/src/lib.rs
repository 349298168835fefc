//! SQLite persistence for the assessment engine.
//!
//! Implements the question, skill, attempt and stats stores, plus the atomic
//! "finalize one session" unit that ties them together.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::{Result, StoreError};
pub use rusqlite;
pub use repository::{
    AttemptRepository, ImportItem, ImportReport, ImportStatus, QuestionFilter, QuestionRepository,
    SkillRepository, SqliteRepository, StatsRepository, UnlockedAchievement,
};
