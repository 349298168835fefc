pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use assessment_core::EngineConfig;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub engine: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(db: Database, engine: EngineConfig) -> Self {
        Self {
            db: Arc::new(db),
            engine: Arc::new(engine),
        }
    }
}

/// Build the full router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Question bank
        .route(
            "/api/questions",
            get(routes::questions::list).post(routes::questions::create),
        )
        .route("/api/questions/count", get(routes::questions::count))
        .route("/api/questions/import", post(routes::questions::import))
        .route(
            "/api/questions/check-duplicate",
            post(routes::questions::check_duplicate),
        )
        .route(
            "/api/questions/{id}",
            get(routes::questions::get).delete(routes::questions::delete),
        )
        // Sessions
        .route("/api/sessions", post(routes::sessions::start))
        .route("/api/sessions/finalize", post(routes::sessions::finalize))
        // Proficiency and gamification
        .route(
            "/api/skills",
            get(routes::skills::list).delete(routes::skills::reset),
        )
        .route("/api/stats", get(routes::stats::get))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    tracing::info!("Opening database at {}", config.database_path.display());
    let db = Database::open(&config.database_path)?;

    let state = AppState::new(db, config.engine);
    let app = build_router(state);

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_route() {
        let state = AppState::new(Database::open_in_memory().unwrap(), EngineConfig::default());
        let response = build_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
