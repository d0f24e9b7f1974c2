/// Language Model Gateway — the single point of entry for all LLM calls.
///
/// No other module may talk to a provider API directly. The workflow only sees
/// `LanguageModelGateway::generate` (prompt in, flat text out); each provider
/// flattens its own response shape through `TextExtractable`.
///
/// Exactly one provider is active per deployment, picked by `LLM_PROVIDER`.
/// A provider without a usable credential yields no gateway at all, which the
/// strategist treats the same as a failed call.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::{LlmProvider, LlmSettings};

pub mod anthropic;
pub mod extract;
pub mod google;
pub mod openai;
pub mod prompts;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use openai::OpenAiProvider;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("LLM request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Http(err)
        }
    }
}

/// A provider response body that can be flattened to plain text.
pub trait TextExtractable {
    fn text(&self) -> String;
}

/// Prompt in, text out.
#[async_trait]
pub trait LanguageModelGateway: Send + Sync {
    fn provider(&self) -> LlmProvider;

    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Error envelope shared by the OpenAI, Anthropic and Gemini APIs:
/// `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Turns a non-success response into `GatewayError::Api`, preferring the
/// provider's own error message over the raw body.
async fn api_error(response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    GatewayError::Api { status, message }
}

/// Decodes a successful body, then flattens it; blank text is `EmptyContent`.
async fn decode_text<T>(response: reqwest::Response) -> Result<String, GatewayError>
where
    T: TextExtractable + serde::de::DeserializeOwned,
{
    let body: T = response.json().await?;
    let text = body.text();
    if text.trim().is_empty() {
        return Err(GatewayError::EmptyContent);
    }
    Ok(text)
}

fn http_client(timeout: Duration) -> Result<Client, GatewayError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(timeout)
        .build()
        .map_err(GatewayError::Http)
}

/// Builds the configured gateway, or `None` when the provider is disabled or
/// has no credential.
pub fn build_gateway(
    settings: &LlmSettings,
) -> Result<Option<Arc<dyn LanguageModelGateway>>, GatewayError> {
    let Some(api_key) = settings.active_api_key() else {
        info!(
            "No credential for LLM provider '{}'; strategist will use keyword fallback",
            settings.provider
        );
        return Ok(None);
    };

    let client = http_client(Duration::from_secs(settings.timeout_secs))?;
    let api_key = api_key.to_string();
    let model = settings.model.clone();

    let gateway: Arc<dyn LanguageModelGateway> = match settings.provider {
        LlmProvider::OpenAi => Arc::new(OpenAiProvider::new(client, api_key, model)),
        LlmProvider::Google => Arc::new(GoogleProvider::new(client, api_key, model)),
        LlmProvider::Anthropic => Arc::new(AnthropicProvider::new(client, api_key, model)),
        LlmProvider::Disabled => return Ok(None),
    };

    info!(
        "LLM gateway initialized (provider: {}, model: {})",
        settings.provider, settings.model
    );
    Ok(Some(gateway))
}
