mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::llm_client::build_gateway;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{ApplicationStore, SqliteApplicationStore};
use crate::workflow::dispatch::ApplicationService;
use crate::workflow::WorkflowEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; everything downstream receives it explicitly
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} v{}", config.app_name, config.app_version);

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;
    let store: Arc<dyn ApplicationStore> = Arc::new(SqliteApplicationStore::new(db));

    // Initialize LLM gateway (None → strategist runs on keyword fallback only)
    let gateway = build_gateway(&config.llm)?;

    // Build the workflow engine and the service that dispatches runs
    let engine = Arc::new(WorkflowEngine::new(
        store.clone(),
        gateway,
        config.artifacts_dir.clone(),
    ));
    let applications = ApplicationService::new(store.clone(), engine);

    // Build app state
    let state = AppState {
        store,
        applications,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
