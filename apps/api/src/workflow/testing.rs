//! Fakes shared by the workflow and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::config::LlmProvider;
use crate::db::test_pool;
use crate::llm_client::{GatewayError, LanguageModelGateway};
use crate::models::application::{ApplicationRecord, ApplicationStatus, ApplicationUpdate};
use crate::store::{ApplicationStore, SqliteApplicationStore, StoreError};
use crate::workflow::adapter::ResumeRenderer;
use crate::workflow::{WorkflowEngine, WorkflowState};

/// SQLite store that also remembers every update it was asked to apply.
pub struct RecordingStore {
    inner: SqliteApplicationStore,
    updates: Mutex<Vec<(i64, ApplicationUpdate)>>,
}

impl RecordingStore {
    pub async fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteApplicationStore::new(test_pool().await),
            updates: Mutex::new(Vec::new()),
        })
    }

    pub fn updates_for(&self, id: i64) -> Vec<ApplicationUpdate> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(row, _)| *row == id)
            .map(|(_, update)| update.clone())
            .collect()
    }

    pub fn statuses_for(&self, id: i64) -> Vec<ApplicationStatus> {
        self.updates_for(id).into_iter().map(|u| u.status).collect()
    }
}

#[async_trait]
impl ApplicationStore for RecordingStore {
    async fn create(&self, job_url: &str) -> Result<ApplicationRecord, StoreError> {
        self.inner.create(job_url).await
    }

    async fn get(&self, id: i64) -> Result<ApplicationRecord, StoreError> {
        self.inner.get(id).await
    }

    async fn list(&self, limit: u32) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.inner.list(limit).await
    }

    async fn update(&self, id: i64, update: ApplicationUpdate) -> Result<(), StoreError> {
        self.updates.lock().unwrap().push((id, update.clone()));
        self.inner.update(id, update).await
    }
}

enum Script {
    Reply(String),
    Timeout,
}

/// Gateway that returns a canned reply (or times out) and counts calls.
pub struct ScriptedGateway {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn reply(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            script: Script::Reply(text.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn timeout() -> Arc<Self> {
        Arc::new(Self {
            script: Script::Timeout,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModelGateway for ScriptedGateway {
    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Timeout => Err(GatewayError::Timeout),
        }
    }
}

/// Renderer that always fails with the given message.
pub struct FailingRenderer(pub &'static str);

#[async_trait]
impl ResumeRenderer for FailingRenderer {
    async fn render(&self, _path: &str, _state: &WorkflowState) -> anyhow::Result<()> {
        Err(anyhow!(self.0))
    }
}

pub fn engine_with(
    store: Arc<RecordingStore>,
    gateway: Option<Arc<ScriptedGateway>>,
) -> WorkflowEngine {
    WorkflowEngine::new(
        store,
        gateway.map(|g| g as Arc<dyn LanguageModelGateway>),
        "artifacts",
    )
}
