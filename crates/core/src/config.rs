//! Application settings.
//!
//! Resolved once at startup and handed to each component's constructor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HelpdeskError, Result};

/// Default location of the optional settings file (extension resolved by `config`).
pub const DEFAULT_CONFIG_PATH: &str = "config/helpdesk";

/// Environment variable that overrides the settings file location.
pub const CONFIG_PATH_ENV: &str = "HELPDESK_CONFIG";

/// Prefix for environment overrides, e.g. `HELPDESK_OLLAMA_MODEL`.
pub const ENV_PREFIX: &str = "HELPDESK";

/// Settings for the answering pipeline and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Application name, used in log lines
    pub app_name: String,

    /// Default tracing filter, e.g. `info` or `helpdesk_llm=debug`
    pub log_level: String,

    /// Generation backend base URL
    pub ollama_host: String,

    /// Backend model identifier
    pub ollama_model: String,

    /// Per-request timeout in seconds
    pub ollama_timeout_secs: u64,

    /// Extra attempts after a timed-out generation call
    pub retry_budget: u32,

    /// Fixed pause between attempts in milliseconds
    pub retry_delay_ms: u64,

    /// Knowledge source location
    pub knowledge_base_path: PathBuf,

    /// Directory holding recorded queries
    pub history_path: PathBuf,

    /// Keyword search result limit
    pub top_k: usize,

    /// Cap applied to the `all` selection method
    pub max_context_entries: usize,

    /// Default sampling temperature
    pub default_temperature: f32,

    /// Default generated token limit
    pub default_max_tokens: u32,

    /// Company named in the prompt's role framing
    pub company_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "AI Customer Support Assistant".to_string(),
            log_level: "info".to_string(),
            ollama_host: "http://localhost:11434".to_string(),
            ollama_model: "mistral".to_string(),
            ollama_timeout_secs: 30,
            retry_budget: 2,
            retry_delay_ms: 1000,
            knowledge_base_path: PathBuf::from("./data/knowledge_base.md"),
            history_path: PathBuf::from("./data/history"),
            top_k: 5,
            max_context_entries: 5,
            default_temperature: 0.3,
            default_max_tokens: 300,
            company_name: "our company".to_string(),
        }
    }
}

impl Settings {
    /// Load settings. Precedence: environment (`HELPDESK_*`) > settings file >
    /// defaults. The file is `path` if given (must exist), else
    /// `$HELPDESK_CONFIG`, else `config/helpdesk.toml` when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();
        let builder = ::config::Config::builder()
            .add_source(
                ::config::Config::try_from(&defaults)
                    .map_err(|e| HelpdeskError::Config(e.to_string()))?,
            );

        let builder = match path {
            Some(p) => builder.add_source(::config::File::from(p).required(true)),
            None => {
                let configured = std::env::var(CONFIG_PATH_ENV)
                    .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
                builder.add_source(::config::File::with_name(&configured).required(false))
            }
        };

        let settings: Settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| HelpdeskError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.ollama_timeout_secs == 0 {
            return Err(HelpdeskError::Config("ollama_timeout_secs must be positive".into()));
        }
        if self.top_k == 0 {
            return Err(HelpdeskError::Config("top_k must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.default_temperature) {
            return Err(HelpdeskError::Config(format!(
                "default_temperature must be within [0, 1], got {}",
                self.default_temperature
            )));
        }
        if self.default_max_tokens == 0 {
            return Err(HelpdeskError::Config("default_max_tokens must be positive".into()));
        }
        Ok(())
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.ollama_timeout_secs)
    }

    /// Pause between generation attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
