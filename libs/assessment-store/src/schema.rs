//! SQLite schema definitions.

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema, safe to run on every open.
pub const SCHEMA: &str = r#"
-- Question bank
CREATE TABLE IF NOT EXISTS questions (
    id TEXT PRIMARY KEY,
    track TEXT NOT NULL,
    competency TEXT NOT NULL,
    topic TEXT NOT NULL,
    difficulty INTEGER NOT NULL DEFAULT 3,
    stem TEXT NOT NULL,
    options TEXT NOT NULL,
    correct_key TEXT NOT NULL,
    rationale TEXT NOT NULL DEFAULT '',
    fingerprint TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Per-skill proficiency
CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    track TEXT NOT NULL,
    competency TEXT NOT NULL,
    topic TEXT NOT NULL,
    mastery_score REAL NOT NULL DEFAULT 0,
    priority_weight REAL NOT NULL DEFAULT 1,
    last_seen TEXT
);

-- Append-only answer log
CREATE TABLE IF NOT EXISTS attempts (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    question_id TEXT NOT NULL REFERENCES questions(id),
    chosen_key TEXT NOT NULL,
    is_correct INTEGER NOT NULL,
    mastery_before REAL NOT NULL,
    mastery_after REAL NOT NULL,
    created_at TEXT NOT NULL
);

-- Gamification state (single user context)
CREATE TABLE IF NOT EXISTS user_stats (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    current_streak INTEGER NOT NULL DEFAULT 0,
    max_streak INTEGER NOT NULL DEFAULT 0,
    total_points INTEGER NOT NULL DEFAULT 0,
    last_activity TEXT
);

CREATE TABLE IF NOT EXISTS achievements (
    code TEXT PRIMARY KEY,
    unlocked_at TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE UNIQUE INDEX IF NOT EXISTS idx_questions_fingerprint ON questions(fingerprint);
CREATE INDEX IF NOT EXISTS idx_questions_track ON questions(track, competency, topic);
CREATE UNIQUE INDEX IF NOT EXISTS idx_skills_key ON skills(track, competency, topic);
CREATE INDEX IF NOT EXISTS idx_attempts_question ON attempts(question_id);
CREATE INDEX IF NOT EXISTS idx_attempts_session ON attempts(session_id);
"#;

/// Initialize the stats row if not exists.
pub const INIT_USER_STATS: &str = r#"
INSERT OR IGNORE INTO user_stats (id) VALUES (1);
"#;
