//! Application Record Store — durable per-application rows.
//!
//! `AppState` and the workflow engine hold an `Arc<dyn ApplicationStore>` so the
//! SQLite backend can be swapped for a recording fake in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::application::{ApplicationRecord, ApplicationUpdate};

pub mod sqlite;

pub use sqlite::SqliteApplicationStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Application id {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Inserts a new `Pending` record and returns it as stored.
    async fn create(&self, job_url: &str) -> Result<ApplicationRecord, StoreError>;

    async fn get(&self, id: i64) -> Result<ApplicationRecord, StoreError>;

    /// Most recent records first.
    async fn list(&self, limit: u32) -> Result<Vec<ApplicationRecord>, StoreError>;

    /// Writes status, error_log and resume_pdf_path in one statement and bumps `updated_at`.
    async fn update(&self, id: i64, update: ApplicationUpdate) -> Result<(), StoreError>;
}
