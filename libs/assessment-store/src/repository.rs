//! Repository pattern for database access.

use crate::error::{Result, StoreError};
use crate::schema::{INIT_USER_STATS, SCHEMA, SCHEMA_VERSION};
use assessment_core::{
    Achievement, Attempt, Corpus, DuplicateDetector, EngineConfig, ExamSession, NewQuestion, Question,
    SessionOutcome, SimilarMatch, Skill, SkillKey, SkillMap, Track, UserStats,
};
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

const QUESTION_COLUMNS: &str =
    "id, track, competency, topic, difficulty, stem, options, correct_key, rationale, fingerprint, created_at";

const SKILL_COLUMNS: &str = "track, competency, topic, mastery_score, priority_weight, last_seen";

const ATTEMPT_COLUMNS: &str =
    "id, session_id, question_id, chosen_key, is_correct, mastery_before, mastery_after, created_at";

/// Criteria for fetching questions. Empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionFilter {
    pub tracks: Vec<Track>,
    pub competencies: Vec<String>,
    pub topics: Vec<String>,
    pub difficulties: Vec<u8>,
    /// Case-insensitive substring of the stem.
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl QuestionFilter {
    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        push_in(
            &mut clauses,
            &mut values,
            "track",
            self.tracks.iter().map(|t| Value::Text(t.as_str().to_string())),
        );
        push_in(
            &mut clauses,
            &mut values,
            "competency",
            self.competencies.iter().map(|c| Value::Text(c.clone())),
        );
        push_in(
            &mut clauses,
            &mut values,
            "topic",
            self.topics.iter().map(|t| Value::Text(t.clone())),
        );
        push_in(
            &mut clauses,
            &mut values,
            "difficulty",
            self.difficulties.iter().map(|d| Value::Integer(i64::from(*d))),
        );

        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            clauses.push("stem LIKE '%' || ? || '%'".to_string());
            values.push(Value::Text(search.to_string()));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

fn push_in<I>(clauses: &mut Vec<String>, values: &mut Vec<Value>, column: &str, items: I)
where
    I: IntoIterator<Item = Value>,
{
    let start = values.len();
    values.extend(items);
    let count = values.len() - start;
    if count > 0 {
        let placeholders = vec!["?"; count].join(",");
        clauses.push(format!("{column} IN ({placeholders})"));
    }
}

/// An achievement with the time it was first unlocked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnlockedAchievement {
    pub achievement: Achievement,
    pub unlocked_at: DateTime<Utc>,
}

/// Per-item result of a batch import.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportStatus {
    Imported { id: Uuid, similar: Vec<SimilarMatch> },
    Duplicate { fingerprint: String },
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportItem {
    pub index: usize,
    #[serde(flatten)]
    pub status: ImportStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub items: Vec<ImportItem>,
}

/// Repository for question bank operations.
pub trait QuestionRepository {
    fn get_question(&self, id: Uuid) -> Result<Option<Question>>;
    fn find_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;
    fn count_questions(&self, filter: &QuestionFilter) -> Result<usize>;
    fn insert_question(&self, question: &Question) -> Result<()>;
    /// Delete a question and its attempts. Returns false if it did not exist.
    fn delete_question(&self, id: Uuid) -> Result<bool>;
    fn all_stems(&self) -> Result<Vec<String>>;
    fn all_fingerprints(&self) -> Result<HashSet<String>>;
    fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool>;
}

/// Repository for skill proficiency records.
pub trait SkillRepository {
    fn get_skill(&self, key: &SkillKey) -> Result<Option<Skill>>;
    /// Fetch a skill, creating it at initial mastery and priority if absent.
    fn get_or_create_skill(&self, key: &SkillKey) -> Result<Skill>;
    fn save_skill(&self, skill: &Skill) -> Result<()>;
    fn skill_map(&self) -> Result<SkillMap>;
    fn list_skills(&self) -> Result<Vec<Skill>>;
    /// Remove every skill record. Returns the number removed.
    fn reset_skills(&self) -> Result<usize>;
}

/// Append-only attempt log.
pub trait AttemptRepository {
    fn append_attempt(&self, attempt: &Attempt) -> Result<()>;
    fn attempts_for_question(&self, question_id: Uuid) -> Result<Vec<Attempt>>;
    fn attempts_for_session(&self, session_id: Uuid) -> Result<Vec<Attempt>>;
    fn count_attempts(&self) -> Result<usize>;
}

/// Repository for the single user's gamification state.
pub trait StatsRepository {
    fn get_user_stats(&self) -> Result<UserStats>;
    fn save_user_stats(&self, stats: &UserStats) -> Result<()>;
    fn unlocked_achievements(&self) -> Result<Vec<UnlockedAchievement>>;
    /// Returns true if the achievement was not unlocked before.
    fn unlock_achievement(&self, achievement: Achievement, at: DateTime<Utc>) -> Result<bool>;
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let repo = Self { conn };
        repo.initialize()?;
        info!(path = %path.as_ref().display(), "opened question database");
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(SCHEMA)?;
        self.conn.execute_batch(INIT_USER_STATS)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Validate and insert a batch of questions in one transaction.
    ///
    /// Exact duplicates are skipped, whether they collide with the stored
    /// bank or with an earlier item of the same batch. Near-duplicates are
    /// imported and reported. Invalid items are reported and skipped.
    pub fn import_questions(
        &mut self,
        items: Vec<NewQuestion>,
        detector: &DuplicateDetector,
        now: DateTime<Utc>,
    ) -> Result<ImportReport> {
        let tx = self.conn.transaction()?;
        let mut fingerprints = all_fingerprints(&tx)?;
        let mut stems = all_stems(&tx)?;
        let mut report = ImportReport::default();

        for (index, item) in items.into_iter().enumerate() {
            let status = match item.validate(now) {
                Err(err) => {
                    report.invalid += 1;
                    ImportStatus::Invalid {
                        message: err.to_string(),
                    }
                }
                Ok(question) => {
                    let check = detector.check(&question.stem, Corpus::Fingerprints(&fingerprints));
                    if check.exact {
                        warn!(index, fingerprint = %question.fingerprint, "skipping duplicate question");
                        report.duplicates += 1;
                        ImportStatus::Duplicate {
                            fingerprint: question.fingerprint,
                        }
                    } else {
                        let similar = detector.find_similar(&question.stem, &stems);
                        insert_question(&tx, &question)?;
                        fingerprints.insert(question.fingerprint.clone());
                        stems.push(question.stem.clone());
                        report.imported += 1;
                        ImportStatus::Imported {
                            id: question.id,
                            similar,
                        }
                    }
                }
            };
            report.items.push(ImportItem { index, status });
        }

        tx.commit()?;
        info!(
            imported = report.imported,
            duplicates = report.duplicates,
            invalid = report.invalid,
            "question import finished"
        );
        Ok(report)
    }

    /// Grade a session and persist everything it changes, atomically.
    ///
    /// Attempts, skill updates and the stats/achievement update are written
    /// in a single transaction. Any failure rolls all of them back and is
    /// reported as [`StoreError::Finalize`]. A session whose attempts are
    /// already recorded is rejected with `SessionAlreadyFinalized`.
    pub fn finalize_session(
        &mut self,
        session: &ExamSession,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<SessionOutcome> {
        if session.question_ids.is_empty() {
            return Err(StoreError::EmptySession);
        }

        let session_id = session.id;
        self.finalize_in_transaction(session, config, now)
            .map_err(|source| {
                warn!(%session_id, error = %source, "session finalization rolled back");
                StoreError::Finalize {
                    session_id,
                    source: Box::new(source),
                }
            })
    }

    fn finalize_in_transaction(
        &mut self,
        session: &ExamSession,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<SessionOutcome> {
        let tx = self.conn.transaction()?;

        if session_finalized(&tx, session.id)? {
            return Err(StoreError::SessionAlreadyFinalized(session.id));
        }

        let mut questions = HashMap::with_capacity(session.question_ids.len());
        for id in &session.question_ids {
            if let Some(question) = get_question(&tx, *id)? {
                questions.insert(*id, question);
            }
        }

        let (graded, tallies) = session.grade(|id| questions.get(&id))?;

        for answer in &graded {
            let question = questions
                .get(&answer.question_id)
                .ok_or(StoreError::QuestionNotFound(answer.question_id))?;
            let skill = get_or_create_skill(&tx, &question.skill_key())?;
            let update = config.mastery.apply(&skill, answer.is_correct, now);
            save_skill(&tx, &update.after)?;
            append_attempt(
                &tx,
                &Attempt {
                    id: Uuid::new_v4(),
                    session_id: session.id,
                    question_id: answer.question_id,
                    chosen_key: answer.chosen_key.clone(),
                    is_correct: answer.is_correct,
                    mastery_before: update.before.mastery_score,
                    mastery_after: update.after.mastery_score,
                    created_at: now,
                },
            )?;
            debug!(
                question_id = %answer.question_id,
                is_correct = answer.is_correct,
                mastery = update.after.mastery_score,
                "graded answer"
            );
        }

        let stats = get_user_stats(&tx)?;
        let update = config.gamification_engine().apply(&stats, &tallies, now);
        save_user_stats(&tx, &update.stats)?;

        tx.commit()?;

        let outcome = update.into_outcome(session.id, tallies);
        info!(
            session_id = %outcome.session_id,
            composite = outcome.composite,
            passed = outcome.passed,
            points = outcome.points_earned,
            rank = %outcome.rank,
            "session finalized"
        );
        Ok(outcome)
    }
}

impl QuestionRepository for SqliteRepository {
    fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
        get_question(&self.conn, id)
    }

    fn find_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let (where_clause, mut values) = filter.where_clause();
        let mut sql = format!("SELECT {QUESTION_COLUMNS} FROM questions{where_clause} ORDER BY created_at, id");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let questions = stmt
            .query_map(params_from_iter(values), row_to_question)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(questions)
    }

    fn count_questions(&self, filter: &QuestionFilter) -> Result<usize> {
        let (where_clause, values) = filter.where_clause();
        let sql = format!("SELECT COUNT(*) FROM questions{where_clause}");
        self.conn
            .query_row(&sql, params_from_iter(values), |row| row.get(0))
            .map_err(Into::into)
    }

    fn insert_question(&self, question: &Question) -> Result<()> {
        insert_question(&self.conn, question)
    }

    fn delete_question(&self, id: Uuid) -> Result<bool> {
        let id = id.to_string();
        self.conn
            .execute("DELETE FROM attempts WHERE question_id = ?1", params![id])?;
        let count = self
            .conn
            .execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }

    fn all_stems(&self) -> Result<Vec<String>> {
        all_stems(&self.conn)
    }

    fn all_fingerprints(&self) -> Result<HashSet<String>> {
        all_fingerprints(&self.conn)
    }

    fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool> {
        fingerprint_exists(&self.conn, fingerprint)
    }
}

impl SkillRepository for SqliteRepository {
    fn get_skill(&self, key: &SkillKey) -> Result<Option<Skill>> {
        get_skill(&self.conn, key)
    }

    fn get_or_create_skill(&self, key: &SkillKey) -> Result<Skill> {
        get_or_create_skill(&self.conn, key)
    }

    fn save_skill(&self, skill: &Skill) -> Result<()> {
        save_skill(&self.conn, skill)
    }

    fn skill_map(&self) -> Result<SkillMap> {
        Ok(self
            .list_skills()?
            .into_iter()
            .map(|skill| (skill.key.clone(), skill))
            .collect())
    }

    fn list_skills(&self) -> Result<Vec<Skill>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills ORDER BY track, competency, topic"
        ))?;
        let skills = stmt
            .query_map([], row_to_skill)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(skills)
    }

    fn reset_skills(&self) -> Result<usize> {
        let count = self.conn.execute("DELETE FROM skills", [])?;
        info!(count, "skills reset");
        Ok(count)
    }
}

impl AttemptRepository for SqliteRepository {
    fn append_attempt(&self, attempt: &Attempt) -> Result<()> {
        append_attempt(&self.conn, attempt)
    }

    fn attempts_for_question(&self, question_id: Uuid) -> Result<Vec<Attempt>> {
        self.query_attempts("question_id", question_id)
    }

    fn attempts_for_session(&self, session_id: Uuid) -> Result<Vec<Attempt>> {
        self.query_attempts("session_id", session_id)
    }

    fn count_attempts(&self) -> Result<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM attempts", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

impl SqliteRepository {
    fn query_attempts(&self, column: &str, id: Uuid) -> Result<Vec<Attempt>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE {column} = ?1 ORDER BY created_at, rowid"
        ))?;
        let attempts = stmt
            .query_map(params![id.to_string()], row_to_attempt)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(attempts)
    }
}

impl StatsRepository for SqliteRepository {
    fn get_user_stats(&self) -> Result<UserStats> {
        get_user_stats(&self.conn)
    }

    fn save_user_stats(&self, stats: &UserStats) -> Result<()> {
        save_user_stats(&self.conn, stats)
    }

    fn unlocked_achievements(&self) -> Result<Vec<UnlockedAchievement>> {
        unlocked_achievements(&self.conn)
    }

    fn unlock_achievement(&self, achievement: Achievement, at: DateTime<Utc>) -> Result<bool> {
        unlock_achievement(&self.conn, achievement, at)
    }
}

// Helpers over a plain connection so the same code runs inside a transaction.

fn get_question(conn: &Connection, id: Uuid) -> Result<Option<Question>> {
    conn.query_row(
        &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
        params![id.to_string()],
        row_to_question,
    )
    .optional()
    .map_err(Into::into)
}

fn insert_question(conn: &Connection, question: &Question) -> Result<()> {
    if fingerprint_exists(conn, &question.fingerprint)? {
        return Err(StoreError::DuplicateFingerprint(question.fingerprint.clone()));
    }

    let options = serde_json::to_string(&question.options)?;
    conn.execute(
        &format!(
            "INSERT INTO questions ({QUESTION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            question.id.to_string(),
            question.track.as_str(),
            question.competency,
            question.topic,
            question.difficulty,
            question.stem,
            options,
            question.correct_key,
            question.rationale,
            question.fingerprint,
            question.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn all_stems(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT stem FROM questions ORDER BY created_at, id")?;
    let stems = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(stems)
}

fn all_fingerprints(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT fingerprint FROM questions")?;
    let fingerprints = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(fingerprints)
}

fn fingerprint_exists(conn: &Connection, fingerprint: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM questions WHERE fingerprint = ?1",
            params![fingerprint],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn get_skill(conn: &Connection, key: &SkillKey) -> Result<Option<Skill>> {
    conn.query_row(
        &format!("SELECT {SKILL_COLUMNS} FROM skills WHERE track = ?1 AND competency = ?2 AND topic = ?3"),
        params![key.track.as_str(), key.competency, key.topic],
        row_to_skill,
    )
    .optional()
    .map_err(Into::into)
}

fn get_or_create_skill(conn: &Connection, key: &SkillKey) -> Result<Skill> {
    if let Some(skill) = get_skill(conn, key)? {
        return Ok(skill);
    }

    let skill = Skill::new(key.clone());
    conn.execute(
        "INSERT INTO skills (track, competency, topic, mastery_score, priority_weight) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            key.track.as_str(),
            key.competency,
            key.topic,
            skill.mastery_score,
            skill.priority_weight,
        ],
    )?;
    Ok(skill)
}

fn save_skill(conn: &Connection, skill: &Skill) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO skills ({SKILL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(track, competency, topic) DO UPDATE SET
                mastery_score = excluded.mastery_score,
                priority_weight = excluded.priority_weight,
                last_seen = excluded.last_seen"
        ),
        params![
            skill.key.track.as_str(),
            skill.key.competency,
            skill.key.topic,
            skill.mastery_score,
            skill.priority_weight,
            skill.last_seen.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

fn append_attempt(conn: &Connection, attempt: &Attempt) -> Result<()> {
    conn.execute(
        &format!("INSERT INTO attempts ({ATTEMPT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            attempt.id.to_string(),
            attempt.session_id.to_string(),
            attempt.question_id.to_string(),
            attempt.chosen_key,
            attempt.is_correct,
            attempt.mastery_before,
            attempt.mastery_after,
            attempt.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn session_finalized(conn: &Connection, session_id: Uuid) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM attempts WHERE session_id = ?1 LIMIT 1",
            params![session_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn get_user_stats(conn: &Connection) -> Result<UserStats> {
    conn.execute_batch(INIT_USER_STATS)?;

    let (current_streak, max_streak, total_points, last_activity): (u32, u32, i64, Option<String>) = conn
        .query_row(
            "SELECT current_streak, max_streak, total_points, last_activity FROM user_stats WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

    let last_activity = last_activity
        .map(|s| parse_timestamp(3, &s))
        .transpose()?;

    let achievements = unlocked_achievements(conn)?
        .into_iter()
        .map(|unlocked| unlocked.achievement)
        .collect();

    Ok(UserStats {
        current_streak,
        max_streak,
        total_points: u64::try_from(total_points).unwrap_or(0),
        last_activity,
        achievements,
    })
}

fn save_user_stats(conn: &Connection, stats: &UserStats) -> Result<()> {
    conn.execute(
        "INSERT INTO user_stats (id, current_streak, max_streak, total_points, last_activity)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            current_streak = excluded.current_streak,
            max_streak = excluded.max_streak,
            total_points = excluded.total_points,
            last_activity = excluded.last_activity",
        params![
            stats.current_streak,
            stats.max_streak,
            i64::try_from(stats.total_points).unwrap_or(i64::MAX),
            stats.last_activity.map(|t| t.to_rfc3339()),
        ],
    )?;

    let unlocked_at = stats.last_activity.unwrap_or_else(Utc::now);
    for achievement in &stats.achievements {
        unlock_achievement(conn, *achievement, unlocked_at)?;
    }
    Ok(())
}

fn unlocked_achievements(conn: &Connection) -> Result<Vec<UnlockedAchievement>> {
    let mut stmt = conn.prepare("SELECT code, unlocked_at FROM achievements ORDER BY unlocked_at, code")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut unlocked = Vec::with_capacity(rows.len());
    for (code, at) in rows {
        let Some(achievement) = Achievement::from_code(&code) else {
            warn!(%code, "ignoring unknown achievement code");
            continue;
        };
        unlocked.push(UnlockedAchievement {
            achievement,
            unlocked_at: parse_timestamp(1, &at)?,
        });
    }
    Ok(unlocked)
}

fn unlock_achievement(conn: &Connection, achievement: Achievement, at: DateTime<Utc>) -> Result<bool> {
    let count = conn.execute(
        "INSERT OR IGNORE INTO achievements (code, unlocked_at) VALUES (?1, ?2)",
        params![achievement.code(), at.to_rfc3339()],
    )?;
    if count > 0 {
        info!(achievement = achievement.code(), "achievement unlocked");
    }
    Ok(count > 0)
}

fn row_to_question(row: &Row) -> rusqlite::Result<Question> {
    let options: String = row.get(6)?;
    Ok(Question {
        id: parse_uuid(0, &row.get::<_, String>(0)?)?,
        track: parse_track(1, &row.get::<_, String>(1)?)?,
        competency: row.get(2)?,
        topic: row.get(3)?,
        difficulty: row.get(4)?,
        stem: row.get(5)?,
        options: serde_json::from_str(&options).map_err(|e| conversion_error(6, e))?,
        correct_key: row.get(7)?,
        rationale: row.get(8)?,
        fingerprint: row.get(9)?,
        created_at: parse_timestamp(10, &row.get::<_, String>(10)?)?,
    })
}

fn row_to_skill(row: &Row) -> rusqlite::Result<Skill> {
    let key = SkillKey::new(
        parse_track(0, &row.get::<_, String>(0)?)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
    );
    Ok(Skill {
        key,
        mastery_score: row.get(3)?,
        priority_weight: row.get(4)?,
        last_seen: row
            .get::<_, Option<String>>(5)?
            .map(|s| parse_timestamp(5, &s))
            .transpose()?,
    })
}

fn row_to_attempt(row: &Row) -> rusqlite::Result<Attempt> {
    Ok(Attempt {
        id: parse_uuid(0, &row.get::<_, String>(0)?)?,
        session_id: parse_uuid(1, &row.get::<_, String>(1)?)?,
        question_id: parse_uuid(2, &row.get::<_, String>(2)?)?,
        chosen_key: row.get(3)?,
        is_correct: row.get(4)?,
        mastery_before: row.get(5)?,
        mastery_after: row.get(6)?,
        created_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
    })
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_uuid(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| conversion_error(idx, e))
}

fn parse_track(idx: usize, s: &str) -> rusqlite::Result<Track> {
    Track::parse(s).ok_or_else(|| conversion_error(idx, assessment_core::AssessmentError::UnknownTrack(s.to_string())))
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}
