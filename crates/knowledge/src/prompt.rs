//! Prompt assembly.
//!
//! Renders fixed instruction templates around a query and its context. The
//! output depends only on the inputs and the assembler's configuration.

use serde::{Deserialize, Serialize};

/// Example exchanges appended when `include_examples` is enabled.
const EXAMPLE_INTERACTIONS: &str = "\
Q: Do you offer student discounts?
A: I don't see information about student discounts in our knowledge base. For questions about special discounts, please contact our support team for the most accurate information.

Q: What's your return policy?
A: According to our policy, customers can return products within 30 days of purchase. The item must be in its original condition with all packaging intact.";

const ANSWER_INSTRUCTIONS: &str = "\
Instructions:
1. Answer based ONLY on the information provided in the knowledge base above
2. If the exact answer isn't in the knowledge base, provide the most relevant information available
3. Be concise and direct in your response
4. Maintain a professional and friendly tone
5. If you cannot find relevant information, politely say so and suggest contacting our support team directly instead of making up information";

const CLARIFICATION_INSTRUCTIONS: &str = "\
Provide a helpful response that either:
1. Answers the most likely interpretation of their question
2. Asks for clarification if the question is too ambiguous
3. Provides information on multiple related topics if appropriate";

/// Most similar questions listed in a clarification prompt.
pub const MAX_SIMILAR_QUESTIONS: usize = 3;

/// Which template a prompt is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Grounded answer with the five support instructions
    #[default]
    Answer,
    /// Disambiguation against similar knowledge base questions
    Clarification,
}

/// Sampling presets for different kinds of prompts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptProfile {
    /// Preset name
    pub name: &'static str,
    /// Sampling temperature
    pub temperature: f32,
    /// Generated token limit
    pub max_tokens: u32,
    /// Template the preset renders with
    pub style: PromptStyle,
}

impl PromptProfile {
    /// Everyday support answers.
    pub const DEFAULT: Self = Self { name: "default", temperature: 0.3, max_tokens: 300, style: PromptStyle::Answer };
    /// Disambiguation of vague questions.
    pub const CLARIFICATION: Self = Self { name: "clarification", temperature: 0.5, max_tokens: 400, style: PromptStyle::Clarification };
    /// Looser, longer phrasing.
    pub const CREATIVE: Self = Self { name: "creative", temperature: 0.7, max_tokens: 500, style: PromptStyle::Answer };
    /// Terse, near-deterministic answers.
    pub const STRICT: Self = Self { name: "strict", temperature: 0.1, max_tokens: 250, style: PromptStyle::Answer };

    /// All known presets.
    pub const ALL: [Self; 4] = [Self::DEFAULT, Self::CLARIFICATION, Self::CREATIVE, Self::STRICT];

    /// Look up a preset by name, falling back to [`PromptProfile::DEFAULT`].
    pub fn named(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .unwrap_or(Self::DEFAULT)
    }
}

/// Builds generation prompts for customer support questions.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    company_name: String,
    include_examples: bool,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new("our company")
    }
}

impl PromptAssembler {
    /// Create an assembler for the given company.
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            include_examples: false,
        }
    }

    /// Append example interactions after the instructions.
    pub fn with_examples(mut self, include: bool) -> Self {
        self.include_examples = include;
        self
    }

    /// Render the prompt for `query` grounded on `context`.
    pub fn render(&self, query: &str, context: &str) -> String {
        let examples = if self.include_examples {
            format!("\n\nExample interactions:\n{}", EXAMPLE_INTERACTIONS)
        } else {
            String::new()
        };
        format!(
            "You are a helpful customer support assistant for {company}. \
             Use the following knowledge base to answer the customer's question accurately and concisely.\n\n\
             Knowledge Base:\n{context}\n\n\
             {instructions}{examples}\n\n\
             Customer Question: {query}\n\n\
             Answer:",
            company = self.company_name,
            instructions = ANSWER_INSTRUCTIONS,
        )
    }

    /// Render a clarification prompt listing up to
    /// [`MAX_SIMILAR_QUESTIONS`] knowledge base questions close to `query`.
    pub fn render_clarification(&self, query: &str, context: &str, similar_questions: &[String]) -> String {
        let similar = if similar_questions.is_empty() {
            "- (no similar questions found)".to_string()
        } else {
            similar_questions
                .iter()
                .take(MAX_SIMILAR_QUESTIONS)
                .map(|q| format!("- {}", q))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            "A customer of {company} has asked a question that might relate to several topics. \
             Help clarify what they're looking for.\n\n\
             Customer Question: {query}\n\n\
             Similar questions in our knowledge base:\n{similar}\n\n\
             Available Information:\n{context}\n\n\
             {instructions}\n\n\
             Answer:",
            company = self.company_name,
            instructions = CLARIFICATION_INSTRUCTIONS,
        )
    }
}
