//! Gamification stats endpoint

use assessment_core::RankProgress;
use assessment_store::StatsRepository;
use axum::{extract::State, Json};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/stats
pub async fn get(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let repo = state.db.repo()?;
    let stats = repo.get_user_stats()?;
    let achievements = repo
        .unlocked_achievements()?
        .into_iter()
        .map(|u| AchievementView::new(u.achievement, u.unlocked_at))
        .collect();

    Ok(Json(StatsResponse {
        current_streak: stats.current_streak,
        max_streak: stats.max_streak,
        total_points: stats.total_points,
        last_activity: stats.last_activity,
        rank: RankProgress::for_points(stats.total_points),
        achievements,
    }))
}
