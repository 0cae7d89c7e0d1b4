//! Helpdesk core data models.
//!
//! This crate defines the data structures, error taxonomy and settings shared
//! by the retrieval-augmented answering pipeline.

#![warn(missing_docs)]

// Core identities
mod id;

// Errors and settings
mod error;
mod config;

// Knowledge and answering
mod knowledge;
mod generation;
mod query_log;

// Re-exports
pub use id::*;
pub use error::{ErrorKind, HelpdeskError, Result};
pub use config::{Settings, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, ENV_PREFIX};

// Knowledge & Answers
pub use knowledge::{
    format_context, ContextSource, KnowledgeBase, QAEntry, RetrievalResult, ScoredEntry,
    SelectionMethod,
};
pub use generation::{AnswerResult, GenerationRequest, GenerationResponse};
pub use query_log::QueryLog;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
