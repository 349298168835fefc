//! API request and response types

use std::collections::{BTreeMap, HashMap};

use assessment_core::{
    Achievement, ExamSession, NewQuestion, Question, RankProgress, SimilarMatch, Skill, Tier, Track,
};
use assessment_store::QuestionFilter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, Result};

// Question types

/// Query string for question listing. List filters are comma-separated.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct QuestionListQuery {
    pub track: Option<String>,
    pub competency: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl QuestionListQuery {
    pub fn to_filter(&self) -> Result<QuestionFilter> {
        let tracks = split_list(self.track.as_deref())
            .map(|t| Track::parse(t).ok_or_else(|| ApiError::Parse(format!("unknown track: {t}"))))
            .collect::<Result<Vec<_>>>()?;
        let difficulties = split_list(self.difficulty.as_deref())
            .map(|d| {
                d.parse::<u8>()
                    .map_err(|_| ApiError::Parse(format!("invalid difficulty: {d}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(QuestionFilter {
            tracks,
            competencies: split_list(self.competency.as_deref()).map(str::to_string).collect(),
            topics: split_list(self.topic.as_deref()).map(str::to_string).collect(),
            difficulties,
            search: self.search.clone(),
            limit: self.limit,
        })
    }
}

fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionListResponse {
    pub total: usize,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateQuestionResponse {
    pub question: Question,
    /// Stored stems close enough to be worth a second look.
    pub similar: Vec<SimilarMatch>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRequest {
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckDuplicateRequest {
    pub stem: String,
    /// Stems to compare against. Non-string entries are skipped.
    #[serde(default)]
    pub corpus: Option<Vec<serde_json::Value>>,
    /// Precomputed fingerprints to compare against.
    #[serde(default)]
    pub fingerprints: Option<Vec<String>>,
}

// Session types

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub competencies: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub difficulties: Vec<u8>,
    pub count: usize,
}

impl StartSessionRequest {
    pub fn to_filter(&self) -> QuestionFilter {
        QuestionFilter {
            tracks: self.tracks.clone(),
            competencies: self.competencies.clone(),
            topics: self.topics.clone(),
            difficulties: self.difficulties.clone(),
            search: None,
            limit: None,
        }
    }
}

/// A question as shown to the candidate, without its answer.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub id: Uuid,
    pub track: Track,
    pub competency: String,
    pub topic: String,
    pub difficulty: u8,
    pub stem: String,
    pub options: BTreeMap<String, String>,
}

impl From<&Question> for SessionQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            track: q.track,
            competency: q.competency.clone(),
            topic: q.topic.clone(),
            difficulty: q.difficulty,
            stem: q.stem.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session: ExamSession,
    pub questions: Vec<SessionQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinalizeSessionRequest {
    pub session: ExamSession,
    /// Answers merged into the session before grading.
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
}

// Skill types

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillView {
    #[serde(flatten)]
    pub skill: Skill,
    pub tier: Tier,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillListResponse {
    pub skills: Vec<SkillView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetSkillsResponse {
    pub removed: usize,
}

// Stats types

#[derive(Debug, Serialize)]
pub struct AchievementView {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked_at: DateTime<Utc>,
}

impl AchievementView {
    pub fn new(achievement: Achievement, unlocked_at: DateTime<Utc>) -> Self {
        Self {
            code: achievement.code(),
            name: achievement.name(),
            description: achievement.description(),
            unlocked_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub current_streak: u32,
    pub max_streak: u32,
    pub total_points: u64,
    pub last_activity: Option<DateTime<Utc>>,
    pub rank: RankProgress,
    pub achievements: Vec<AchievementView>,
}
