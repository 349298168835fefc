//! Common test utilities and fixtures for integration tests.
//!
//! Every context owns a fresh in-memory SQLite database, so tests need no
//! external services and never share state.

#![allow(dead_code)]

pub mod fixtures;

use assessment_backend::db::Database;
use assessment_backend::{build_router, AppState};
use assessment_core::{EngineConfig, NewQuestion, Question};
use assessment_store::QuestionRepository;
use axum_test::TestServer;
use chrono::Utc;

/// Test context holding the application state behind the server.
pub struct TestContext {
    pub state: AppState,
}

impl TestContext {
    /// Create a context with default engine settings.
    pub fn new() -> Self {
        Self::with_engine(EngineConfig::default())
    }

    pub fn with_engine(engine: EngineConfig) -> Self {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        Self {
            state: AppState::new(db, engine),
        }
    }

    /// Start an axum-test server over this context's state.
    pub fn server(&self) -> TestServer {
        TestServer::new(build_router(self.state.clone())).expect("Failed to start test server")
    }

    /// Insert questions directly, bypassing the API.
    pub fn seed(&self, items: Vec<NewQuestion>) -> Vec<Question> {
        let repo = self.state.db.repo().expect("Failed to lock database");
        items
            .into_iter()
            .map(|item| {
                let question = item.validate(Utc::now()).expect("Invalid fixture question");
                repo.insert_question(&question).expect("Failed to insert question");
                question
            })
            .collect()
    }
}
