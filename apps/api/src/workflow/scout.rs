//! Scout stage — obtains the job description for the posting URL.

use async_trait::async_trait;
use tracing::debug;

use crate::models::application::{ApplicationStatus, ApplicationUpdate};
use crate::workflow::{Stage, WorkflowEngine, WorkflowError, WorkflowState};

/// Description returned while posting retrieval is not wired to a real scraper.
pub const PLACEHOLDER_JOB_DESCRIPTION: &str = "We are hiring a full-stack AI developer with \
    Python, FastAPI, React, SQL, and LLM integration experience.";

/// Source of job descriptions for a posting URL.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_description(&self, job_url: &str) -> anyhow::Result<String>;
}

/// Returns `PLACEHOLDER_JOB_DESCRIPTION` for every URL.
pub struct PlaceholderJobSource;

#[async_trait]
impl JobSource for PlaceholderJobSource {
    async fn fetch_description(&self, job_url: &str) -> anyhow::Result<String> {
        debug!("Using placeholder job description for {job_url}");
        Ok(PLACEHOLDER_JOB_DESCRIPTION.to_string())
    }
}

impl WorkflowEngine {
    pub(super) async fn scout(
        &self,
        mut state: WorkflowState,
    ) -> Result<WorkflowState, WorkflowError> {
        let description = self
            .job_source
            .fetch_description(&state.job_url)
            .await
            .map_err(|e| WorkflowError::stage(Stage::Scout, format!("{e:#}")))?;

        if description.trim().is_empty() {
            return Err(WorkflowError::stage(
                Stage::Scout,
                format!("no job description found at {}", state.job_url),
            ));
        }

        state.job_description = description;
        self.checkpoint(
            Stage::Scout,
            state,
            ApplicationUpdate::status(ApplicationStatus::Found),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::ApplicationStore;
    use crate::workflow::testing::{engine_with, RecordingStore};

    struct EmptySource;

    #[async_trait]
    impl JobSource for EmptySource {
        async fn fetch_description(&self, _job_url: &str) -> anyhow::Result<String> {
            Ok("   ".to_string())
        }
    }

    #[tokio::test]
    async fn test_scout_fills_description_and_marks_found() {
        let store = RecordingStore::new().await;
        let record = store.create("https://example.com/job/1").await.unwrap();
        let engine = engine_with(store.clone(), None);

        let state = engine
            .scout(WorkflowState::new(record.id, record.job_url.clone()))
            .await
            .unwrap();

        assert_eq!(state.job_description, PLACEHOLDER_JOB_DESCRIPTION);
        assert_eq!(state.application_status, ApplicationStatus::Found);
        assert_eq!(
            store.get(record.id).await.unwrap().status,
            ApplicationStatus::Found
        );
    }

    #[tokio::test]
    async fn test_blank_description_fails_without_persisting() {
        let store = RecordingStore::new().await;
        let record = store.create("https://example.com/job/1").await.unwrap();
        let engine = engine_with(store.clone(), None).with_job_source(Arc::new(EmptySource));

        let err = engine
            .scout(WorkflowState::new(record.id, record.job_url.clone()))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("scout stage failed"));
        assert!(store.updates_for(record.id).is_empty());
    }
}
