//! Caller-owned exam session state.
//!
//! An [`ExamSession`] holds the selected question ids and the answers given so
//! far. It is a plain value threaded by the caller between selection and
//! finalization; nothing about an in-flight session is stored globally.

use crate::error::{AssessmentError, Result};
use crate::types::{Question, TrackTallies};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Key recorded for a question left unanswered.
pub const UNANSWERED_KEY: &str = "NONE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamSession {
    pub id: Uuid,
    pub question_ids: Vec<Uuid>,
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
    pub started_at: DateTime<Utc>,
}

/// One question of a session after grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub chosen_key: String,
    pub is_correct: bool,
}

impl ExamSession {
    pub fn new(question_ids: Vec<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question_ids,
            answers: HashMap::new(),
            started_at: now,
        }
    }

    /// Record (or replace) the answer to one of this session's questions.
    pub fn answer(&mut self, question_id: Uuid, key: &str) -> Result<()> {
        if !self.question_ids.contains(&question_id) {
            return Err(AssessmentError::NotInSession(question_id));
        }
        self.answers.insert(question_id, key.trim().to_ascii_uppercase());
        Ok(())
    }

    pub fn answered_count(&self) -> usize {
        self.question_ids
            .iter()
            .filter(|id| self.answers.contains_key(id))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.answered_count() == self.question_ids.len()
    }

    /// Grade every question of the session, in session order.
    ///
    /// `lookup` resolves a question id; an id it cannot resolve is an error
    /// since every attempt must reference an existing question. Unanswered
    /// questions are graded incorrect with [`UNANSWERED_KEY`]. A question id
    /// listed twice is rejected, so each question is graded once.
    pub fn grade<'q, F>(&self, mut lookup: F) -> Result<(Vec<GradedAnswer>, TrackTallies)>
    where
        F: FnMut(Uuid) -> Option<&'q Question>,
    {
        if self.question_ids.is_empty() {
            return Err(AssessmentError::EmptySession);
        }

        let mut seen = HashSet::with_capacity(self.question_ids.len());
        if let Some(repeated) = self.question_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(AssessmentError::DuplicateQuestion(*repeated));
        }

        let mut graded = Vec::with_capacity(self.question_ids.len());
        let mut tallies = TrackTallies::default();

        for id in &self.question_ids {
            let question = lookup(*id).ok_or(AssessmentError::UnknownQuestion(*id))?;
            let chosen_key = self
                .answers
                .get(id)
                .cloned()
                .unwrap_or_else(|| UNANSWERED_KEY.to_string());
            let is_correct = question.is_correct(&chosen_key);
            tallies.record(question.track, is_correct);
            graded.push(GradedAnswer {
                question_id: *id,
                chosen_key,
                is_correct,
            });
        }

        Ok((graded, tallies))
    }
}
