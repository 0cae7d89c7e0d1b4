//! Knowledge Service
//!
//! Knowledge base parsing and storage, lexical retrieval, and prompt assembly.

#![warn(missing_docs)]

pub mod parser;
pub mod store;
pub mod retriever;
pub mod prompt;

pub use parser::{normalize_text, parse_entries, parse_knowledge_base};
pub use store::{KnowledgeBaseStore, KnowledgeSource, KnowledgeState};
pub use retriever::{Retriever, DEFAULT_TOP_K};
pub use prompt::{PromptAssembler, PromptProfile, PromptStyle, MAX_SIMILAR_QUESTIONS};
