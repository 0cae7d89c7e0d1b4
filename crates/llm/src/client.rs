//! Ollama generation client.
//!
//! Wraps the backend's `/`, `/api/tags` and `/api/generate` endpoints and
//! applies the retry policy: timeouts are retried up to the retry budget with
//! a fixed pause, everything else fails on the first attempt.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use helpdesk_core::{GenerationRequest, GenerationResponse, HelpdeskError, Result, Settings};

use crate::transport::{RawResponse, ReqwestTransport, Transport, TransportError};

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Connection settings for [`OllamaClient`].
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Backend base URL
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause between attempts
    pub retry_delay: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            timeout: Duration::from_secs(30),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl From<&Settings> for OllamaConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            base_url: settings.ollama_host.clone(),
            model: settings.ollama_model.clone(),
            timeout: settings.timeout(),
            retry_delay: settings.retry_delay(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

/// Outcome of a single generation attempt.
enum Attempt {
    Success(String),
    TimedOut,
    Failed(HelpdeskError),
}

/// Client for an Ollama-compatible generation backend.
pub struct OllamaClient<T: Transport = ReqwestTransport> {
    transport: T,
    config: OllamaConfig,
}

impl OllamaClient<ReqwestTransport> {
    /// Create a client using HTTP.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.base_url.clone(), config.timeout)?;
        info!(
            "Initialized Ollama client: {}, model: {}",
            config.base_url, config.model
        );
        Ok(Self { transport, config })
    }
}

impl<T: Transport> OllamaClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(transport: T, config: OllamaConfig) -> Self {
        Self { transport, config }
    }

    /// Configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Connection settings.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Best-effort reachability check. Never fails; any error means
    /// unavailable.
    pub async fn check_availability(&self) -> bool {
        match self.transport.get("/").await {
            Ok(resp) => resp.is_success(),
            Err(e) => {
                error!("Ollama connection check failed: {}", e);
                false
            }
        }
    }

    /// Whether the backend lists a model whose name starts with the base name
    /// of `model_id` (the part before any `:tag`).
    pub async fn check_model_present(&self, model_id: &str) -> bool {
        let resp = match self.transport.get("/api/tags").await {
            Ok(resp) if resp.is_success() => resp,
            Ok(resp) => {
                warn!("Model listing returned status {}", resp.status);
                return false;
            }
            Err(e) => {
                error!("Failed to check model availability: {}", e);
                return false;
            }
        };

        let tags: TagsResponse = match serde_json::from_str(&resp.body) {
            Ok(tags) => tags,
            Err(e) => {
                warn!("Unparseable model listing: {}", e);
                return false;
            }
        };

        let base = model_base_name(model_id);
        tags.models.iter().any(|m| m.name.starts_with(base))
    }

    /// Generate text, retrying timed-out attempts up to `retry_budget` more
    /// times.
    ///
    /// Fails with `Connection` when every attempt times out or the backend is
    /// unreachable, and with `Generation` on a non-2xx status, an unreadable
    /// body or an empty answer.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        retry_budget: u32,
    ) -> Result<GenerationResponse> {
        let body = serde_json::to_value(GenerateBody {
            model: &request.model_identifier,
            prompt: &request.prompt_text,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_output_tokens,
            },
        })
        .map_err(|e| HelpdeskError::generation(format!("failed to encode request: {}", e)))?;

        let total = retry_budget.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(
                "Sending request to Ollama: model={}, prompt_length={}, attempt={}/{}",
                request.model_identifier,
                request.prompt_text.len(),
                attempt,
                total
            );

            match self.attempt(&body).await {
                Attempt::Success(text) => {
                    debug!("Received response: length={}", text.len());
                    return Ok(GenerationResponse {
                        generated_text: text,
                        attempts: attempt,
                    });
                }
                Attempt::TimedOut if attempt < total => {
                    warn!("Request timeout (attempt {}/{}), retrying...", attempt, total);
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Attempt::TimedOut => {
                    return Err(HelpdeskError::Connection {
                        reason: format!(
                            "Request timeout after retries ({} attempts, {:?} each)",
                            total, self.config.timeout
                        ),
                        attempts: total,
                    });
                }
                Attempt::Failed(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, body: &serde_json::Value) -> Attempt {
        let resp = match self.transport.post_json("/api/generate", body).await {
            Ok(resp) => resp,
            Err(TransportError::Timeout) => return Attempt::TimedOut,
            Err(TransportError::Connect(msg)) => {
                return Attempt::Failed(HelpdeskError::Connection {
                    reason: msg,
                    attempts: 1,
                })
            }
            Err(TransportError::Other(msg)) => {
                return Attempt::Failed(HelpdeskError::generation(format!(
                    "failed to generate response: {}",
                    msg
                )))
            }
        };
        match parse_reply(resp) {
            Ok(text) => Attempt::Success(text),
            Err(e) => Attempt::Failed(e),
        }
    }
}

fn parse_reply(resp: RawResponse) -> Result<String> {
    if !resp.is_success() {
        return Err(HelpdeskError::status(resp.status, resp.body));
    }
    let reply: GenerateReply = serde_json::from_str(&resp.body)
        .map_err(|e| HelpdeskError::generation(format!("unreadable response body: {}", e)))?;
    let text = reply.response.trim();
    if text.is_empty() {
        return Err(HelpdeskError::generation("empty response from backend"));
    }
    Ok(text.to_string())
}

/// Model name without its `:tag` suffix.
pub fn model_base_name(model_id: &str) -> &str {
    model_id.split(':').next().unwrap_or(model_id)
}
