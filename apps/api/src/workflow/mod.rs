//! Application workflow: Scout → Strategist → Adapter → Executioner.
//!
//! A run threads one `WorkflowState` value through the four stages in fixed
//! order. Stages that own a status transition persist it before handing the
//! state on, so a later failure leaves the record at the last completed stage.
//! Any stage error aborts the run and is returned to the caller; recording the
//! `Failed` status is the dispatcher's job (see `dispatch`).

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::llm_client::LanguageModelGateway;
use crate::models::application::{ApplicationStatus, ApplicationUpdate};
use crate::store::{ApplicationStore, StoreError};

pub mod adapter;
pub mod dispatch;
pub mod prompts;
pub mod scout;
pub mod strategist;

use adapter::{PlaceholderRenderer, ResumeRenderer};
use scout::{JobSource, PlaceholderJobSource};

// ────────────────────────────────────────────────────────────────────────────
// Stages and state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Scout,
    Strategist,
    Adapter,
    Executioner,
}

impl Stage {
    pub const FIRST: Stage = Stage::Scout;

    /// The stage that follows this one, or `None` after the last.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Scout => Some(Stage::Strategist),
            Stage::Strategist => Some(Stage::Adapter),
            Stage::Adapter => Some(Stage::Executioner),
            Stage::Executioner => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scout => "scout",
            Stage::Strategist => "strategist",
            Stage::Adapter => "adapter",
            Stage::Executioner => "executioner",
        };
        f.write_str(name)
    }
}

/// Per-run state. Lives only for the duration of one run; the durable trace is
/// whatever the stages wrote to the record store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    pub application_id: i64,
    pub job_url: String,
    pub job_description: String,
    pub extracted_skills: Vec<String>,
    pub selected_projects: Vec<String>,
    pub resume_pdf_path: String,
    pub application_status: ApplicationStatus,
    pub error_log: String,
}

impl WorkflowState {
    pub fn new(application_id: i64, job_url: impl Into<String>) -> Self {
        Self {
            application_id,
            job_url: job_url.into(),
            job_description: String::new(),
            extracted_skills: Vec::new(),
            selected_projects: Vec::new(),
            resume_pdf_path: String::new(),
            application_status: ApplicationStatus::Pending,
            error_log: String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{stage} stage failed: {message}")]
    Stage { stage: Stage, message: String },

    #[error("Failed to persist workflow progress: {0}")]
    Persistence(#[from] StoreError),
}

impl WorkflowError {
    pub fn stage(stage: Stage, message: impl Into<String>) -> Self {
        WorkflowError::Stage {
            stage,
            message: message.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Runs the fixed four-stage pipeline. Built once at startup and shared.
pub struct WorkflowEngine {
    store: Arc<dyn ApplicationStore>,
    /// `None` when no provider is configured; the strategist then goes straight to fallback.
    gateway: Option<Arc<dyn LanguageModelGateway>>,
    job_source: Arc<dyn JobSource>,
    renderer: Arc<dyn ResumeRenderer>,
    artifacts_dir: String,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        gateway: Option<Arc<dyn LanguageModelGateway>>,
        artifacts_dir: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            job_source: Arc::new(PlaceholderJobSource),
            renderer: Arc::new(PlaceholderRenderer),
            artifacts_dir: artifacts_dir.into(),
        }
    }

    pub fn with_job_source(mut self, job_source: Arc<dyn JobSource>) -> Self {
        self.job_source = job_source;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ResumeRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Executes every stage in order and returns the final state.
    pub async fn run(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        let span = info_span!(
            "workflow",
            application_id = state.application_id,
            run_id = %Uuid::new_v4()
        );
        self.run_stages(state).instrument(span).await
    }

    async fn run_stages(&self, mut state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        let mut next = Some(Stage::FIRST);

        while let Some(stage) = next {
            debug!("Entering {stage} stage");
            state = match stage {
                Stage::Scout => self.scout(state).await?,
                Stage::Strategist => self.strategist(state).await?,
                Stage::Adapter => self.adapter(state).await?,
                Stage::Executioner => self.executioner(state).await?,
            };
            next = stage.next();
        }

        info!(
            "Workflow finished for {} with status {}",
            state.job_url, state.application_status
        );
        Ok(state)
    }

    /// Persists a status transition for `stage` and mirrors it onto the state.
    /// Transitions that would move the record backwards are refused.
    async fn checkpoint(
        &self,
        stage: Stage,
        mut state: WorkflowState,
        update: ApplicationUpdate,
    ) -> Result<WorkflowState, WorkflowError> {
        let current = state.application_status;
        if !current.can_advance_to(update.status) {
            return Err(WorkflowError::stage(
                stage,
                format!("refusing status transition {current} -> {}", update.status),
            ));
        }

        let status = update.status;
        self.store.update(state.application_id, update).await?;
        state.application_status = status;
        info!("Application {} is now {status}", state.application_id);
        Ok(state)
    }

    /// Executioner: the single write that records both `Applied` and the artifact path.
    async fn executioner(&self, state: WorkflowState) -> Result<WorkflowState, WorkflowError> {
        if state.resume_pdf_path.is_empty() {
            return Err(WorkflowError::stage(
                Stage::Executioner,
                "no resume artifact path was produced",
            ));
        }

        let update = ApplicationUpdate::status(ApplicationStatus::Applied)
            .with_resume_pdf_path(state.resume_pdf_path.clone());
        self.checkpoint(Stage::Executioner, state, update).await
    }
}

#[cfg(test)]
pub(crate) mod testing;
