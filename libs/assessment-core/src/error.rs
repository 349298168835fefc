//! Error types for assessment-core.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using AssessmentError.
pub type Result<T> = std::result::Result<T, AssessmentError>;

/// Errors raised while validating questions or driving a session.
#[derive(Debug, Error, PartialEq)]
pub enum AssessmentError {
    #[error("unknown track: {0}")]
    UnknownTrack(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("expected 3 or 4 options, got {0}")]
    OptionCount(usize),

    #[error("invalid option key: {0}")]
    InvalidOptionKey(String),

    #[error("correct key {0} does not name an option")]
    InvalidCorrectKey(String),

    #[error("difficulty must be between 1 and 5, got {0}")]
    DifficultyOutOfRange(u8),

    #[error("question {0} is not part of this session")]
    NotInSession(Uuid),

    #[error("question {0} is missing from the bank")]
    UnknownQuestion(Uuid),

    #[error("question {0} appears more than once in the session")]
    DuplicateQuestion(Uuid),

    #[error("session has no questions")]
    EmptySession,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
