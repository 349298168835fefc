//! Question bank endpoints

use std::collections::HashSet;

use assessment_core::{Corpus, DuplicateReport, NewQuestion, Question};
use assessment_store::{ImportReport, QuestionRepository};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/questions
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<Json<QuestionListResponse>> {
    let filter = query.to_filter()?;
    let repo = state.db.repo()?;
    let total = repo.count_questions(&filter)?;
    let questions = repo.find_questions(&filter)?;
    Ok(Json(QuestionListResponse { total, questions }))
}

/// GET /api/questions/count
pub async fn count(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<Json<CountResponse>> {
    let filter = query.to_filter()?;
    let count = state.db.repo()?.count_questions(&filter)?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/questions/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Question>> {
    state
        .db
        .repo()?
        .get_question(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("question {id}")))
}

/// POST /api/questions
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewQuestion>,
) -> Result<(StatusCode, Json<CreateQuestionResponse>)> {
    let question = payload.validate(Utc::now())?;
    let repo = state.db.repo()?;

    if repo.fingerprint_exists(&question.fingerprint)? {
        tracing::warn!(fingerprint = %question.fingerprint, "rejected duplicate question");
        return Err(ApiError::Conflict(format!(
            "a question with the same normalized stem already exists ({})",
            question.fingerprint
        )));
    }

    let similar = state
        .engine
        .duplicate_detector()
        .find_similar(&question.stem, repo.all_stems()?);
    repo.insert_question(&question)?;
    tracing::info!(id = %question.id, track = %question.track, similar = similar.len(), "question created");

    Ok((StatusCode::CREATED, Json(CreateQuestionResponse { question, similar })))
}

/// DELETE /api/questions/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if state.db.repo()?.delete_question(id)? {
        tracing::info!(%id, "question deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("question {id}")))
    }
}

/// POST /api/questions/import
pub async fn import(
    State(state): State<AppState>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportReport>> {
    let detector = state.engine.duplicate_detector();
    let report = state
        .db
        .blocking(move |repo| Ok(repo.import_questions(payload.questions, &detector, Utc::now())?))
        .await?;
    Ok(Json(report))
}

/// POST /api/questions/check-duplicate
///
/// Compares against the supplied corpus, else the supplied fingerprints,
/// else the stored bank.
pub async fn check_duplicate(
    State(state): State<AppState>,
    Json(payload): Json<CheckDuplicateRequest>,
) -> Result<Json<DuplicateReport>> {
    if payload.stem.trim().is_empty() {
        return Err(ApiError::BadRequest("stem must not be empty".to_string()));
    }
    let detector = state.engine.duplicate_detector();

    let report = match (payload.corpus, payload.fingerprints) {
        (Some(corpus), _) => {
            let stems: Vec<String> = corpus
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            detector.check(&payload.stem, Corpus::Stems(&stems))
        }
        (None, Some(fingerprints)) => {
            let known: HashSet<String> = fingerprints.into_iter().collect();
            detector.check(&payload.stem, Corpus::Fingerprints(&known))
        }
        (None, None) => {
            let stems = state.db.repo()?.all_stems()?;
            detector.check(&payload.stem, Corpus::Stems(&stems))
        }
    };

    Ok(Json(report))
}
