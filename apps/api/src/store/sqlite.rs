use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::models::application::{ApplicationRecord, ApplicationStatus, ApplicationUpdate};
use crate::store::{ApplicationStore, StoreError};

/// `applications` table backed by a sqlx SQLite pool.
#[derive(Clone)]
pub struct SqliteApplicationStore {
    pool: SqlitePool,
}

impl SqliteApplicationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for SqliteApplicationStore {
    async fn create(&self, job_url: &str) -> Result<ApplicationRecord, StoreError> {
        let now = Utc::now();

        let record = sqlx::query_as::<_, ApplicationRecord>(
            r#"
            INSERT INTO applications (job_url, status, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(job_url)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!("Created application {} for {}", record.id, record.job_url);
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<ApplicationRecord, StoreError> {
        sqlx::query_as::<_, ApplicationRecord>("SELECT * FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, limit: u32) -> Result<Vec<ApplicationRecord>, StoreError> {
        let records = sqlx::query_as::<_, ApplicationRecord>(
            "SELECT * FROM applications ORDER BY id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn update(&self, id: i64, update: ApplicationUpdate) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = ?, error_log = ?, resume_pdf_path = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.error_log.as_deref())
        .bind(update.resume_pdf_path.as_deref())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        debug!("Application {id} -> {}", update.status);
        Ok(())
    }
}
