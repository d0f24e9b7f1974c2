//! Application Service — turns an apply request into a background workflow run.
//!
//! Runs are fire-and-forget: `submit` returns as soon as the `Pending` record
//! exists, and the only observable outcome of the run is what it writes to the
//! record store. Each submission is executed at most once; nothing re-drives a
//! run that was lost (e.g. on process exit).

use std::sync::Arc;

use tracing::{error, info};

use crate::models::application::{ApplicationRecord, ApplicationStatus, ApplicationUpdate};
use crate::store::{ApplicationStore, StoreError};
use crate::workflow::{WorkflowEngine, WorkflowError, WorkflowState};

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
    engine: Arc<WorkflowEngine>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn ApplicationStore>, engine: Arc<WorkflowEngine>) -> Self {
        Self { store, engine }
    }

    /// Creates the `Pending` record and schedules its workflow run.
    pub async fn submit(&self, job_url: &str) -> Result<ApplicationRecord, StoreError> {
        let record = self.store.create(job_url).await?;
        info!("Accepted application {} for {}", record.id, record.job_url);

        let state = WorkflowState::new(record.id, record.job_url.clone());
        let service = self.clone();
        // Outcome lives in the record store; failures are already logged and recorded.
        tokio::spawn(async move {
            service.run_and_record(state).await.ok();
        });

        Ok(record)
    }

    /// Runs the workflow and, if it aborts, records `Failed` with the error text.
    pub async fn run_and_record(
        &self,
        state: WorkflowState,
    ) -> Result<WorkflowState, WorkflowError> {
        let application_id = state.application_id;

        let result = self.engine.run(state).await;
        if let Err(err) = &result {
            error!("Workflow for application {application_id} failed: {err}");

            let update = ApplicationUpdate::status(ApplicationStatus::Failed)
                .with_error_log(err.to_string());
            if let Err(store_err) = self.store.update(application_id, update).await {
                error!("Could not record failure of application {application_id}: {store_err}");
            }
        }

        result
    }
}
