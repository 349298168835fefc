//! Skill proficiency endpoints

use assessment_store::SkillRepository;
use axum::{extract::State, Json};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/skills
pub async fn list(State(state): State<AppState>) -> Result<Json<SkillListResponse>> {
    let skills = state
        .db
        .repo()?
        .list_skills()?
        .into_iter()
        .map(|skill| SkillView {
            tier: state.engine.selection.tier_for(skill.mastery_score),
            skill,
        })
        .collect();
    Ok(Json(SkillListResponse { skills }))
}

/// DELETE /api/skills
pub async fn reset(State(state): State<AppState>) -> Result<Json<ResetSkillsResponse>> {
    let removed = state.db.repo()?.reset_skills()?;
    Ok(Json(ResetSkillsResponse { removed }))
}
