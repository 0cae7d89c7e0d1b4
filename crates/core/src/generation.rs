//! Generation request/response and answer models.

use serde::{Deserialize, Serialize};

use crate::error::{HelpdeskError, Result};
use crate::knowledge::{ContextSource, SelectionMethod};

/// A single call to the generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Backend model identifier, e.g. `mistral` or `mistral:7b`
    pub model_identifier: String,

    /// Full prompt text
    pub prompt_text: String,

    /// Sampling temperature in `[0, 1]`
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    /// Create a validated request.
    pub fn new(
        model_identifier: impl Into<String>,
        prompt_text: impl Into<String>,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(HelpdeskError::InvalidRequest(format!(
                "temperature must be within [0, 1], got {}",
                temperature
            )));
        }
        if max_output_tokens == 0 {
            return Err(HelpdeskError::InvalidRequest(
                "max_output_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            model_identifier: model_identifier.into(),
            prompt_text: prompt_text.into(),
            temperature,
            max_output_tokens,
        })
    }
}

/// Successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Trimmed, non-empty generated text
    pub generated_text: String,

    /// Attempts used, including the successful one
    pub attempts: u32,
}

/// Answer plus timing and diagnostic metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated answer
    pub answer_text: String,

    /// Wall-clock time for context resolution, prompt and generation
    pub elapsed_time_ms: u64,

    /// Model that produced the answer
    pub model_identifier: String,

    /// Requested selection method
    pub context_selection_method: SelectionMethod,

    /// How the context was actually produced
    pub context_source: ContextSource,

    /// Length of the context block in characters
    pub context_length_chars: usize,
}

impl AnswerResult {
    /// Short description of the context, as stored in query history.
    pub fn context_descriptor(&self) -> String {
        format!(
            "Method: {}, Length: {}",
            self.context_selection_method, self.context_length_chars
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_request_validation() {
        assert!(GenerationRequest::new("mistral", "hi", 0.0, 1).is_ok());
        assert!(GenerationRequest::new("mistral", "hi", 1.0, 300).is_ok());
        assert!(matches!(
            GenerationRequest::new("mistral", "hi", 1.5, 300),
            Err(HelpdeskError::InvalidRequest(_))
        ));
        assert!(matches!(
            GenerationRequest::new("mistral", "hi", -0.1, 300),
            Err(HelpdeskError::InvalidRequest(_))
        ));
        assert!(matches!(
            GenerationRequest::new("mistral", "hi", 0.3, 0),
            Err(HelpdeskError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_context_descriptor() {
        let result = AnswerResult {
            answer_text: "Returns within 30 days.".into(),
            elapsed_time_ms: 12,
            model_identifier: "mistral".into(),
            context_selection_method: SelectionMethod::Keyword,
            context_source: ContextSource::Keyword,
            context_length_chars: 57,
        };
        assert_eq!(result.context_descriptor(), "Method: keyword, Length: 57");
    }
}
