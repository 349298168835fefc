//! Validation of incoming questions.
//!
//! Rules:
//! - stem, competency and topic must be non-empty
//! - 3 or 4 options keyed `A`..`D` (case-insensitive, no repeats), each with text
//! - the correct key must name one of the options
//! - difficulty is 1..=5 and defaults to 3

use crate::dedupe::fingerprint;
use crate::error::{AssessmentError, Result};
use crate::types::{NewQuestion, Question, Track};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const OPTION_KEYS: [&str; 4] = ["A", "B", "C", "D"];
pub const DEFAULT_DIFFICULTY: u8 = 3;

impl NewQuestion {
    /// Validate and fingerprint into a storable question with a fresh id.
    pub fn validate(self, now: DateTime<Utc>) -> Result<Question> {
        let track = Track::parse(&self.track).ok_or_else(|| AssessmentError::UnknownTrack(self.track.clone()))?;

        let stem = required(self.stem, "stem")?;
        let competency = required(self.competency, "competency")?;
        let topic = required(self.topic, "topic")?;

        let difficulty = self.difficulty.unwrap_or(DEFAULT_DIFFICULTY);
        if !(1..=5).contains(&difficulty) {
            return Err(AssessmentError::DifficultyOutOfRange(difficulty));
        }

        let mut options = BTreeMap::new();
        for (key, text) in self.options {
            let key = key.trim().to_ascii_uppercase();
            if !OPTION_KEYS.contains(&key.as_str()) {
                return Err(AssessmentError::InvalidOptionKey(key));
            }
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if options.contains_key(&key) {
                return Err(AssessmentError::InvalidOptionKey(key));
            }
            options.insert(key, text.to_string());
        }
        if !(3..=4).contains(&options.len()) {
            return Err(AssessmentError::OptionCount(options.len()));
        }

        let correct_key = self.correct_key.trim().to_ascii_uppercase();
        if !options.contains_key(&correct_key) {
            return Err(AssessmentError::InvalidCorrectKey(correct_key));
        }

        Ok(Question {
            id: Uuid::new_v4(),
            track,
            competency,
            topic,
            difficulty,
            fingerprint: fingerprint(&stem),
            stem,
            options,
            correct_key,
            rationale: self.rationale.trim().to_string(),
            created_at: now,
        })
    }
}

fn required(value: String, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AssessmentError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_question() -> NewQuestion {
        NewQuestion {
            track: "FUNCIONAL".to_string(),
            competency: "Gestión Tributaria".to_string(),
            topic: "Devoluciones".to_string(),
            difficulty: None,
            stem: "¿Cuál es el plazo para resolver una devolución?".to_string(),
            options: [("a", "50 días"), ("B", "30 días"), ("c", "10 días"), ("D", "")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            correct_key: " a ".to_string(),
            rationale: "Artículo 855 del E.T.".to_string(),
        }
    }

    #[test]
    fn valid_question_is_normalized_and_fingerprinted() {
        let q = new_question().validate(Utc::now()).unwrap();
        assert_eq!(q.track, Track::Functional);
        assert_eq!(q.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(q.correct_key, "A");
        assert_eq!(q.options.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(q.fingerprint, fingerprint("cual es el plazo para resolver una devolucion"));
    }

    #[test]
    fn rejects_unknown_track() {
        let mut input = new_question();
        input.track = "TECH".to_string();
        assert_eq!(input.validate(Utc::now()).unwrap_err(), AssessmentError::UnknownTrack("TECH".to_string()));
    }

    #[test]
    fn rejects_blank_stem() {
        let mut input = new_question();
        input.stem = "   ".to_string();
        assert_eq!(input.validate(Utc::now()).unwrap_err(), AssessmentError::MissingField("stem"));
    }

    #[test]
    fn rejects_too_few_options() {
        let mut input = new_question();
        input.options.remove("c");
        assert_eq!(input.validate(Utc::now()).unwrap_err(), AssessmentError::OptionCount(2));
    }

    #[test]
    fn rejects_foreign_option_key() {
        let mut input = new_question();
        input.options.insert("E".to_string(), "otro".to_string());
        assert_eq!(input.validate(Utc::now()).unwrap_err(), AssessmentError::InvalidOptionKey("E".to_string()));
    }

    #[test]
    fn rejects_keys_repeated_across_case() {
        let mut input = new_question();
        input.options.insert("A".to_string(), "60 días".to_string());
        assert_eq!(input.validate(Utc::now()).unwrap_err(), AssessmentError::InvalidOptionKey("A".to_string()));
    }

    #[test]
    fn rejects_correct_key_without_option() {
        let mut input = new_question();
        input.correct_key = "D".to_string();
        assert_eq!(input.validate(Utc::now()).unwrap_err(), AssessmentError::InvalidCorrectKey("D".to_string()));
    }

    #[test]
    fn rejects_difficulty_out_of_range() {
        let mut input = new_question();
        input.difficulty = Some(6);
        assert_eq!(input.validate(Utc::now()).unwrap_err(), AssessmentError::DifficultyOutOfRange(6));
    }
}
