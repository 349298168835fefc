//! Exam session endpoints

use assessment_core::{ExamSession, SessionOutcome};
use assessment_store::{QuestionRepository, SkillRepository};
use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/sessions
///
/// Draws up to `count` questions matching the filters, biased toward weak
/// skills. Answers are not included in the response.
pub async fn start(
    State(state): State<AppState>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>> {
    if payload.count == 0 {
        return Err(ApiError::BadRequest("count must be at least 1".to_string()));
    }

    let repo = state.db.repo()?;
    let candidates = repo.find_questions(&payload.to_filter())?;
    if candidates.is_empty() {
        return Err(ApiError::NotFound("no questions match the requested filters".to_string()));
    }
    let skills = repo.skill_map()?;
    drop(repo);

    let selected = state.engine.selection.select(&candidates, &skills, payload.count);
    let session = ExamSession::new(selected.iter().map(|q| q.id).collect(), Utc::now());
    tracing::info!(
        session_id = %session.id,
        requested = payload.count,
        selected = selected.len(),
        pool = candidates.len(),
        "session started"
    );

    Ok(Json(StartSessionResponse {
        questions: selected.into_iter().map(SessionQuestion::from).collect(),
        session,
    }))
}

/// POST /api/sessions/finalize
///
/// A session is applied once; sending it again is a conflict.
pub async fn finalize(
    State(state): State<AppState>,
    Json(payload): Json<FinalizeSessionRequest>,
) -> Result<Json<SessionOutcome>> {
    let mut session = payload.session;
    for (question_id, key) in &payload.answers {
        session.answer(*question_id, key)?;
    }

    let engine = *state.engine;
    let outcome = state
        .db
        .blocking(move |repo| Ok(repo.finalize_session(&session, &engine, Utc::now())?))
        .await?;
    Ok(Json(outcome))
}
