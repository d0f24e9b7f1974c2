//! Adapter stage — decides where the tailored resume lives and renders it.
//! Nothing is persisted here; the Executioner records the path.

use async_trait::async_trait;
use tracing::debug;

use crate::workflow::{Stage, WorkflowEngine, WorkflowError, WorkflowState};

/// Renders the tailored resume to `path`.
#[async_trait]
pub trait ResumeRenderer: Send + Sync {
    async fn render(&self, path: &str, state: &WorkflowState) -> anyhow::Result<()>;
}

/// Produces no file; the path is still reserved for the application.
pub struct PlaceholderRenderer;

#[async_trait]
impl ResumeRenderer for PlaceholderRenderer {
    async fn render(&self, path: &str, state: &WorkflowState) -> anyhow::Result<()> {
        debug!(
            "Skipping render of {path} ({} projects)",
            state.selected_projects.len()
        );
        Ok(())
    }
}

/// Artifact path for an application, `{artifacts_dir}/resume_{id}.pdf`.
pub fn resume_pdf_path(artifacts_dir: &str, application_id: i64) -> String {
    let dir = artifacts_dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("resume_{application_id}.pdf")
    } else {
        format!("{dir}/resume_{application_id}.pdf")
    }
}

impl WorkflowEngine {
    pub(super) async fn adapter(
        &self,
        mut state: WorkflowState,
    ) -> Result<WorkflowState, WorkflowError> {
        if state.selected_projects.is_empty() {
            return Err(WorkflowError::stage(
                Stage::Adapter,
                "no projects were selected",
            ));
        }

        let path = resume_pdf_path(&self.artifacts_dir, state.application_id);
        self.renderer
            .render(&path, &state)
            .await
            .map_err(|e| WorkflowError::stage(Stage::Adapter, format!("{e:#}")))?;

        state.resume_pdf_path = path;
        Ok(state)
    }
}
