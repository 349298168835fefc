//! Store error types.

use assessment_core::AssessmentError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    #[error("question not found: {0}")]
    QuestionNotFound(Uuid),

    #[error("a question with fingerprint {0} already exists")]
    DuplicateFingerprint(String),

    #[error("session has no questions")]
    EmptySession,

    #[error("session {0} was already finalized")]
    SessionAlreadyFinalized(Uuid),

    #[error("failed to finalize session {session_id}: {source}")]
    Finalize {
        session_id: Uuid,
        #[source]
        source: Box<StoreError>,
    },
}
