//! Shared handle to the SQLite question database.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use assessment_store::SqliteRepository;

use crate::error::{ApiError, Result};

/// Serializes access to the single SQLite connection.
///
/// Guards must not be held across an `.await`.
pub struct Database {
    repo: Mutex<SqliteRepository>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            repo: Mutex::new(SqliteRepository::open(path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            repo: Mutex::new(SqliteRepository::open_in_memory()?),
        })
    }

    /// Lock the repository for one request.
    pub fn repo(&self) -> Result<MutexGuard<'_, SqliteRepository>> {
        self.repo
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))
    }

    /// Run a long repository operation on the blocking thread pool.
    pub async fn blocking<F, T>(self: &Arc<Self>, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteRepository) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let mut repo = db.repo()?;
            f(&mut *repo)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("database task failed: {e}")))?
    }
}
