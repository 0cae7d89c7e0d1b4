//! LLM Service
//!
//! Client for an Ollama-compatible generation backend.

#![warn(missing_docs)]

pub mod transport;
pub mod client;

pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError};
pub use client::{model_base_name, OllamaClient, OllamaConfig, DEFAULT_RETRY_DELAY};
