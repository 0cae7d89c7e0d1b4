//! Support Assistant
//!
//! Answers customer questions: resolves knowledge base context, renders the
//! prompt, drives the generation backend and records the exchange.

#![warn(missing_docs)]

pub mod request;
pub mod answerer;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use request::{validate_question, AnswerRequest, MAX_QUESTION_CHARS, MIN_QUESTION_CHARS};
pub use answerer::{Answerer, NO_KNOWLEDGE_BASE_CONTEXT};
pub use service::{AskOutcome, SupportService};
