//! Server configuration from environment variables.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use assessment_core::{EngineConfig, MissingFunctionalPolicy, SelectionStrategy};

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set but unparsable values are
    /// errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid PORT: {v}"))?,
            None => 3000,
        };
        let database_path = lookup("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let mut engine = EngineConfig::default();
        if let Some(v) = lookup("DUPLICATE_THRESHOLD") {
            engine.duplicates.threshold = v
                .parse()
                .with_context(|| format!("invalid DUPLICATE_THRESHOLD: {v}"))?;
        }
        if let Some(v) = lookup("SELECTION_STRATEGY") {
            engine.selection.strategy = SelectionStrategy::parse(&v)
                .ok_or_else(|| anyhow!("invalid SELECTION_STRATEGY: {v}"))?;
        }
        if let Some(v) = lookup("MISSING_FUNCTIONAL_POLICY") {
            engine.scoring.missing_functional = MissingFunctionalPolicy::parse(&v)
                .ok_or_else(|| anyhow!("invalid MISSING_FUNCTIONAL_POLICY: {v}"))?;
        }
        if let Some(v) = lookup("DAILY_RESET_HOUR") {
            engine.gamification.daily_reset_hour = v
                .parse()
                .with_context(|| format!("invalid DAILY_RESET_HOUR: {v}"))?;
        }
        engine.validate()?;

        Ok(Self {
            host,
            port,
            database_path,
            engine,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("assessment-engine")
        .join("assessment.db")
}
