use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_APP_NAME: &str = "Domain Expansion API";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/applications.db";
const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
/// Built once in `main` and handed to every component that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub app_version: String,
    pub database_url: String,
    /// Directory prefix for generated resume artifacts.
    pub artifacts_dir: String,
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmSettings,
}

/// Which language model provider a deployment talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Google,
    Anthropic,
    /// Gateway disabled; the strategist always uses its keyword fallback.
    Disabled,
}

impl LlmProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Google => "gemini-1.5-flash",
            LlmProvider::Anthropic => "claude-sonnet-4-5",
            LlmProvider::Disabled => "",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Google => "google",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Disabled => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "google" | "gemini" => Ok(LlmProvider::Google),
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            "none" | "" => Ok(LlmProvider::Disabled),
            other => bail!(
                "Unknown LLM_PROVIDER '{other}' (expected openai, google, anthropic or none)"
            ),
        }
    }
}

/// Provider selection and credentials for the language model gateway.
#[derive(Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub timeout_secs: u64,
}

impl LlmSettings {
    /// The credential for the configured provider, if one is present and non-blank.
    pub fn active_api_key(&self) -> Option<&str> {
        let key = match self.provider {
            LlmProvider::OpenAi => self.openai_api_key.as_deref(),
            LlmProvider::Google => self.google_api_key.as_deref(),
            LlmProvider::Anthropic => self.anthropic_api_key.as_deref(),
            LlmProvider::Disabled => None,
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }
}

// Keys stay out of logs.
impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Every variable is optional.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider: LlmProvider = lookup("LLM_PROVIDER")
            .unwrap_or_else(|| "openai".to_string())
            .parse()?;

        let model = lookup("LLM_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        let timeout_secs = match lookup("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => 8080,
        };

        Ok(Config {
            app_name: lookup("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            app_version: lookup("APP_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            artifacts_dir: lookup("ARTIFACTS_DIR")
                .unwrap_or_else(|| DEFAULT_ARTIFACTS_DIR.to_string()),
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm: LlmSettings {
                provider,
                model,
                openai_api_key: lookup("OPENAI_API_KEY"),
                google_api_key: lookup("GOOGLE_API_KEY"),
                anthropic_api_key: lookup("ANTHROPIC_API_KEY"),
                timeout_secs,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.app_name, "Domain Expansion API");
        assert_eq!(config.database_url, "sqlite://data/applications.db");
        assert_eq!(config.artifacts_dir, "artifacts");
        assert_eq!(config.port, 8080);
        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 30);
        assert!(config.llm.active_api_key().is_none());
    }

    #[test]
    fn test_provider_selects_default_model() {
        let config = config_from(&[("LLM_PROVIDER", "google")]).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Google);
        assert_eq!(config.llm.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_explicit_model_wins() {
        let config =
            config_from(&[("LLM_PROVIDER", "anthropic"), ("LLM_MODEL", "claude-haiku")]).unwrap();
        assert_eq!(config.llm.model, "claude-haiku");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(config_from(&[("LLM_PROVIDER", "mistral")]).is_err());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_active_api_key_follows_provider() {
        let config = config_from(&[
            ("LLM_PROVIDER", "google"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("GOOGLE_API_KEY", "g-key"),
        ])
        .unwrap();
        assert_eq!(config.llm.active_api_key(), Some("g-key"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(config.llm.active_api_key().is_none());
    }

    #[test]
    fn test_disabled_provider_has_no_key() {
        let config = config_from(&[("LLM_PROVIDER", "none"), ("OPENAI_API_KEY", "sk")]).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Disabled);
        assert!(config.llm.active_api_key().is_none());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        let rendered = format!("{:?}", config.llm);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
