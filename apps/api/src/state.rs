use std::sync::Arc;

use crate::config::Config;
use crate::store::ApplicationStore;
use crate::workflow::dispatch::ApplicationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ApplicationStore>,
    /// Creates records and schedules their workflow runs.
    pub applications: ApplicationService,
    pub config: Config,
}
