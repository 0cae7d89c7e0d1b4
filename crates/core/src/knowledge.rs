//! Knowledge model - curated question/answer entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HelpdeskError, Result};

/// A single question/answer pair parsed from the knowledge source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QAEntry {
    /// Normalized question text
    pub question: String,

    /// Normalized answer text
    pub answer: String,

    /// Position in the source, starting at 0
    pub ordinal: usize,
}

impl QAEntry {
    /// Create a new entry.
    pub fn new(question: impl Into<String>, answer: impl Into<String>, ordinal: usize) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ordinal,
        }
    }

    /// Render as the two-line `Q:`/`A:` block used in prompts.
    pub fn render(&self) -> String {
        format!("Q: {}\nA: {}", self.question, self.answer)
    }
}

/// Ordered, non-empty collection of [`QAEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeBase {
    entries: Vec<QAEntry>,
}

impl KnowledgeBase {
    /// Build a knowledge base, rejecting an empty entry list.
    pub fn new(entries: Vec<QAEntry>, source_name: &str) -> Result<Self> {
        if entries.is_empty() {
            return Err(HelpdeskError::NoEntriesParsed {
                source_name: source_name.to_string(),
            });
        }
        Ok(Self { entries })
    }

    /// Entries in ordinal order.
    pub fn entries(&self) -> &[QAEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed knowledge base.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at the given ordinal.
    pub fn get(&self, ordinal: usize) -> Option<&QAEntry> {
        self.entries.get(ordinal)
    }

    /// Render the whole knowledge base, optionally keeping only the first
    /// `max_entries` entries.
    pub fn format_context(&self, max_entries: Option<usize>) -> String {
        format_context(&self.entries, max_entries)
    }
}

/// Render entries as `Q:`/`A:` blocks separated by a blank line, in ordinal
/// order, truncated to `max_entries` if given.
pub fn format_context<'a, I>(entries: I, max_entries: Option<usize>) -> String
where
    I: IntoIterator<Item = &'a QAEntry>,
{
    let mut sorted: Vec<&QAEntry> = entries.into_iter().collect();
    sorted.sort_by_key(|e| e.ordinal);
    if let Some(max) = max_entries {
        sorted.truncate(max);
    }
    sorted
        .iter()
        .map(|e| e.render())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Policy used to choose which entries become prompt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    /// Every entry, optionally capped
    All,
    /// Lexical overlap scoring with full-base fallback
    Keyword,
}

impl SelectionMethod {
    /// Wire/CLI name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Keyword => "keyword",
        }
    }
}

impl Default for SelectionMethod {
    fn default() -> Self {
        Self::Keyword
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMethod {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "keyword" => Ok(Self::Keyword),
            other => Err(HelpdeskError::InvalidSelectionMethod(other.to_string())),
        }
    }
}

/// How the context of a request was actually produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// `all` method
    All,
    /// `keyword` method with at least one match
    Keyword,
    /// `keyword` method with no match; the full base was used
    KeywordFallback,
    /// No knowledge base was loaded
    Placeholder,
}

/// An entry together with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredEntry {
    /// The entry
    pub entry: QAEntry,
    /// Relevance score (0 when scoring was bypassed)
    pub score: u32,
}

/// Ranked entries plus their rendered context text.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    /// Selected entries in rank order
    pub entries: Vec<ScoredEntry>,
    /// Rendered `Q:`/`A:` context
    pub context: String,
    /// How the selection was made
    pub source: ContextSource,
}

impl RetrievalResult {
    /// Number of selected entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
