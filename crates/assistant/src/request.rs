//! Answer requests and question validation.

use helpdesk_core::{HelpdeskError, Result, SelectionMethod, Settings};
use helpdesk_knowledge::{PromptProfile, PromptStyle};
use serde::{Deserialize, Serialize};

/// Shortest accepted question, in characters after trimming.
pub const MIN_QUESTION_CHARS: usize = 3;

/// Longest accepted question, in characters after trimming.
pub const MAX_QUESTION_CHARS: usize = 500;

/// Trim a question and check that it is answerable.
pub fn validate_question(question: &str) -> Result<&str> {
    let trimmed = question.trim();
    let len = trimmed.chars().count();
    if len < MIN_QUESTION_CHARS {
        return Err(HelpdeskError::InvalidRequest(format!(
            "question must be at least {} characters",
            MIN_QUESTION_CHARS
        )));
    }
    if len > MAX_QUESTION_CHARS {
        return Err(HelpdeskError::InvalidRequest(format!(
            "question must be at most {} characters, got {}",
            MAX_QUESTION_CHARS, len
        )));
    }
    if !trimmed.chars().any(char::is_alphanumeric) {
        return Err(HelpdeskError::InvalidRequest(
            "question must contain letters or digits".to_string(),
        ));
    }
    Ok(trimmed)
}

/// One question plus the knobs that shape its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Trimmed question text
    pub query: String,
    /// Context selection method
    pub method: SelectionMethod,
    /// Sampling temperature in `[0, 1]`
    pub temperature: f32,
    /// Generated token limit
    pub max_tokens: u32,
    /// Cap for the `all` method
    pub max_context_entries: Option<usize>,
    /// Prompt template
    #[serde(default)]
    pub style: PromptStyle,
}

impl AnswerRequest {
    /// Build a request from raw caller input.
    ///
    /// Fails with `InvalidSelectionMethod` for an unknown method and
    /// `InvalidRequest` for an unusable question or parameter.
    pub fn new(
        query: &str,
        method: &str,
        temperature: f32,
        max_tokens: u32,
        max_context_entries: Option<usize>,
    ) -> Result<Self> {
        let method: SelectionMethod = method.parse()?;
        let query = validate_question(query)?.to_string();
        if !(0.0..=1.0).contains(&temperature) {
            return Err(HelpdeskError::InvalidRequest(format!(
                "temperature must be within [0, 1], got {}",
                temperature
            )));
        }
        if max_tokens == 0 {
            return Err(HelpdeskError::InvalidRequest(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            query,
            method,
            temperature,
            max_tokens,
            max_context_entries,
            style: PromptStyle::Answer,
        })
    }

    /// Keyword request using the configured sampling defaults.
    pub fn with_settings(query: &str, settings: &Settings) -> Result<Self> {
        Self::new(
            query,
            SelectionMethod::default().as_str(),
            settings.default_temperature,
            settings.default_max_tokens,
            Some(settings.max_context_entries),
        )
    }

    /// Replace the sampling parameters and template with a preset.
    pub fn with_profile(mut self, profile: PromptProfile) -> Self {
        self.temperature = profile.temperature;
        self.max_tokens = profile.max_tokens;
        self.style = profile.style;
        self
    }

    /// Replace the prompt template.
    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    /// Replace the selection method.
    pub fn with_method(mut self, method: SelectionMethod) -> Self {
        self.method = method;
        self
    }
}
