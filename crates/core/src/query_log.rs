//! Query log model - one answered question.

use serde::{Deserialize, Serialize};

use crate::id::QueryLogId;
use crate::Time;

/// A recorded question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLog {
    /// Unique identifier
    pub id: QueryLogId,

    /// The customer's question
    pub question: String,

    /// The generated answer
    pub answer: String,

    /// Processing time in milliseconds
    pub processing_time_ms: Option<u64>,

    /// Model that produced the answer
    pub model_used: String,

    /// Description of the context used
    pub context_used: Option<String>,

    /// Question length in characters
    pub question_length: usize,

    /// Answer length in characters
    pub answer_length: usize,

    /// When the exchange was recorded
    pub timestamp: Time,
}

impl QueryLog {
    /// Create a new record stamped with the current time.
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        processing_time_ms: Option<u64>,
        model_used: impl Into<String>,
        context_used: Option<String>,
    ) -> Self {
        let question = question.into();
        let answer = answer.into();
        Self {
            id: QueryLogId::new(),
            question_length: question.chars().count(),
            answer_length: answer.chars().count(),
            question,
            answer,
            processing_time_ms,
            model_used: model_used.into(),
            context_used,
            timestamp: chrono::Utc::now(),
        }
    }
}
