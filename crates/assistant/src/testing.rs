//! Test doubles shared by the assistant tests.

use async_trait::async_trait;
use helpdesk_core::Settings;
use helpdesk_llm::{OllamaClient, OllamaConfig, RawResponse, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const FAQ: &str = "# FAQ\n\nQ: What is the refund policy?\nA: Returns within 30 days.\n\nQ: How do I contact support?\nA: Email support@example.com.";

type Reply = Result<RawResponse, TransportError>;

/// Backend double: answers `GET` checks with `get_reply` and generation calls
/// from a queue, falling back to `default_generate`.
pub(crate) struct FakeBackend {
    get_reply: Reply,
    generate_replies: Mutex<VecDeque<Reply>>,
    default_generate: Reply,
    pub(crate) prompts: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn answering(text: &str) -> Self {
        Self {
            get_reply: ok(r#"{"models":[{"name":"mistral:latest"}]}"#),
            generate_replies: Mutex::new(VecDeque::new()),
            default_generate: ok(&serde_json::json!({ "response": text }).to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(reply: Reply) -> Self {
        Self {
            default_generate: reply,
            ..Self::answering("unused")
        }
    }

    pub(crate) fn with_get(mut self, reply: Reply) -> Self {
        self.get_reply = reply;
        self
    }

    pub(crate) fn then(self, reply: Reply) -> Self {
        self.generate_replies.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub(crate) fn generate_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn get(&self, _path: &str) -> Reply {
        self.get_reply.clone()
    }

    async fn post_json(&self, _path: &str, body: &serde_json::Value) -> Reply {
        let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
        self.prompts.lock().unwrap().push(prompt);
        let queued = self.generate_replies.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.default_generate.clone())
    }
}

pub(crate) fn ok(body: &str) -> Reply {
    Ok(RawResponse { status: 200, body: body.to_string() })
}

pub(crate) fn client(backend: FakeBackend, settings: &Settings) -> OllamaClient<FakeBackend> {
    let config = OllamaConfig {
        retry_delay: Duration::from_millis(1),
        ..OllamaConfig::from(settings)
    };
    OllamaClient::with_transport(backend, config)
}
