//! Lexical retriever.
//!
//! Scores entries by word overlap with the query: each query word found in
//! the question counts twice, each found in the answer counts once.

use helpdesk_core::{
    format_context, ContextSource, KnowledgeBase, QAEntry, RetrievalResult, ScoredEntry,
    SelectionMethod,
};
use std::collections::HashSet;
use tracing::debug;

/// Default number of keyword matches returned.
pub const DEFAULT_TOP_K: usize = 5;

const QUESTION_WEIGHT: u32 = 2;
const ANSWER_WEIGHT: u32 = 1;

/// Words that carry no relevance signal on their own.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "how",
    "i", "if", "in", "is", "it", "me", "my", "of", "on", "or", "our", "so", "that", "the", "this",
    "to", "was", "we", "what", "when", "where", "which", "who", "why", "will", "with", "you",
    "your",
];

/// Selects knowledge base entries relevant to a query.
#[derive(Debug, Clone)]
pub struct Retriever {
    top_k: usize,
}

impl Default for Retriever {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

impl Retriever {
    /// Create a retriever returning at most `top_k` keyword matches.
    pub fn new(top_k: usize) -> Self {
        Self { top_k: top_k.max(1) }
    }

    /// Keyword match limit.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Apply a selection method.
    ///
    /// `All` returns every entry, capped at `max_entries` when given.
    /// `Keyword` returns the top scoring entries, or the whole knowledge base
    /// when nothing matches.
    pub fn retrieve(
        &self,
        query: &str,
        kb: &KnowledgeBase,
        method: SelectionMethod,
        max_entries: Option<usize>,
    ) -> RetrievalResult {
        match method {
            SelectionMethod::All => {
                let entries = unscored(kb.entries(), max_entries);
                build_result(entries, ContextSource::All)
            }
            SelectionMethod::Keyword => {
                let hits = self.search(query, kb);
                if hits.is_empty() {
                    debug!("No keyword matches, falling back to the full knowledge base");
                    build_result(unscored(kb.entries(), None), ContextSource::KeywordFallback)
                } else {
                    build_result(hits, ContextSource::Keyword)
                }
            }
        }
    }

    /// Rank entries with a positive score, highest first. Equal scores keep
    /// ordinal order.
    pub fn search(&self, query: &str, kb: &KnowledgeBase) -> Vec<ScoredEntry> {
        let query_words = tokenize(query);
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredEntry> = kb
            .entries()
            .iter()
            .map(|entry| ScoredEntry {
                score: score_entry(&query_words, entry),
                entry: entry.clone(),
            })
            .filter(|s| s.score > 0)
            .collect();

        // Stable sort keeps ordinal order between equal scores
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.top_k);

        debug!("Keyword search matched {} entries", scored.len());
        scored
    }
}

/// Relevance of an entry for an already tokenized query.
pub fn score_entry(query_words: &HashSet<String>, entry: &QAEntry) -> u32 {
    let question_words = tokenize(&entry.question);
    let answer_words = tokenize(&entry.answer);

    let question_hits = query_words.intersection(&question_words).count() as u32;
    let answer_hits = query_words.intersection(&answer_words).count() as u32;

    QUESTION_WEIGHT * question_hits + ANSWER_WEIGHT * answer_hits
}

/// Lowercase word set with surrounding punctuation and stop words removed.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty() && !STOP_WORDS.contains(&word.as_str()))
        .collect()
}

fn unscored(entries: &[QAEntry], max_entries: Option<usize>) -> Vec<ScoredEntry> {
    let limit = max_entries.unwrap_or(entries.len());
    entries
        .iter()
        .take(limit)
        .map(|entry| ScoredEntry {
            entry: entry.clone(),
            score: 0,
        })
        .collect()
}

/// `entries` keep rank order; the rendered context is always in ordinal order.
fn build_result(entries: Vec<ScoredEntry>, source: ContextSource) -> RetrievalResult {
    let context = format_context(entries.iter().map(|s| &s.entry), None);
    RetrievalResult {
        entries,
        context,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq() -> KnowledgeBase {
        KnowledgeBase::new(
            vec![
                QAEntry::new("What is the refund policy?", "Returns within 30 days.", 0),
                QAEntry::new("How do I contact support?", "Email support@example.com.", 1),
            ],
            "inline",
        )
        .unwrap()
    }

    fn larger_faq() -> KnowledgeBase {
        KnowledgeBase::new(
            vec![
                QAEntry::new("Shipping times?", "Orders ship within 2 days.", 0),
                QAEntry::new("Refund timing?", "Refunds post in 5 days.", 1),
                QAEntry::new("Order tracking?", "Use the tracking link in your email.", 2),
                QAEntry::new("Refund for damaged order?", "Send a photo and we refund.", 3),
                QAEntry::new("Gift cards?", "Available in the store.", 4),
            ],
            "inline",
        )
        .unwrap()
    }

    #[test]
    fn test_tokenize_lowercases_and_trims_punctuation() {
        let words = tokenize("What's the REFUND policy?!");
        assert!(words.contains("refund"));
        assert!(words.contains("policy"));
        assert!(words.contains("what's"));
        assert!(!words.contains("the"));
    }

    #[test]
    fn test_tokenize_collapses_duplicates() {
        assert_eq!(tokenize("refund refund Refund").len(), 1);
    }

    #[test]
    fn test_question_hits_weigh_double() {
        let query = tokenize("refund days");
        let entry = QAEntry::new("What is the refund policy?", "Returns within 30 days.", 0);
        assert_eq!(score_entry(&query, &entry), 3);
    }

    #[test]
    fn test_refund_query_selects_refund_entry() {
        let retriever = Retriever::default();
        let kb = faq();
        let hits = retriever.search("I want a refund", &kb);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.ordinal, 0);
        assert_eq!(hits[0].score, 2);

        let result = retriever.retrieve("I want a refund", &kb, SelectionMethod::Keyword, None);
        assert_eq!(result.source, ContextSource::Keyword);
        assert!(result.context.contains("Q: What is the refund policy?"));
        assert!(result.context.contains("A: Returns within 30 days."));
        assert!(!result.context.contains("contact support"));
    }

    #[test]
    fn test_keyword_results_are_positive_and_ordered() {
        let retriever = Retriever::default();
        let kb = larger_faq();
        for query in ["refund order", "tracking order email", "refund days", "gift store refund"] {
            let hits = retriever.search(query, &kb);
            assert!(hits.iter().all(|h| h.score > 0), "query {query:?}");
            for pair in hits.windows(2) {
                assert!(pair[0].score >= pair[1].score, "query {query:?}");
                if pair[0].score == pair[1].score {
                    assert!(pair[0].entry.ordinal < pair[1].entry.ordinal, "query {query:?}");
                }
            }
        }
    }

    #[test]
    fn test_ties_keep_ordinal_order() {
        let retriever = Retriever::default();
        let hits = retriever.search("refund", &larger_faq());
        let ordinals: Vec<_> = hits.iter().map(|h| h.entry.ordinal).collect();
        // "Refund timing?" (q) and "Refund for damaged order?" (q + a) and nothing else
        assert_eq!(ordinals, vec![3, 1]);
        assert_eq!(hits[0].score, 3);
        assert_eq!(hits[1].score, 2);

        let hits = retriever.search("shipping gift", &larger_faq());
        let ordinals: Vec<_> = hits.iter().map(|h| h.entry.ordinal).collect();
        assert_eq!(ordinals, vec![0, 4]);
        assert!(hits.iter().all(|h| h.score == 2));
    }

    #[test]
    fn test_keyword_context_is_in_ordinal_order() {
        let kb = KnowledgeBase::new(
            vec![
                QAEntry::new("Shipping?", "We ship, refund fast.", 0),
                QAEntry::new("Refund policy?", "A refund takes 5 days.", 1),
            ],
            "inline",
        )
        .unwrap();
        let result = Retriever::default().retrieve("refund", &kb, SelectionMethod::Keyword, None);

        let ranked: Vec<_> = result.entries.iter().map(|s| (s.entry.ordinal, s.score)).collect();
        assert_eq!(ranked, vec![(1, 3), (0, 1)]);
        assert_eq!(result.context, kb.format_context(None));
        assert!(result.context.starts_with("Q: Shipping?"));
    }

    #[test]
    fn test_top_k_limits_results() {
        let retriever = Retriever::new(1);
        let hits = retriever.search("refund order", &larger_faq());
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_keyword_without_matches_falls_back_to_everything() {
        let retriever = Retriever::default();
        let kb = faq();
        let result = retriever.retrieve("zebra", &kb, SelectionMethod::Keyword, Some(1));
        assert_eq!(result.source, ContextSource::KeywordFallback);
        assert_eq!(result.len(), 2);
        assert_eq!(result.context, kb.format_context(None));
    }

    #[test]
    fn test_stop_word_only_query_falls_back() {
        let retriever = Retriever::default();
        let result = retriever.retrieve("how do I", &faq(), SelectionMethod::Keyword, None);
        assert_eq!(result.source, ContextSource::KeywordFallback);
    }

    #[test]
    fn test_all_method_with_cap() {
        let retriever = Retriever::default();
        let result = retriever.retrieve("anything", &faq(), SelectionMethod::All, Some(1));
        assert_eq!(result.source, ContextSource::All);
        assert_eq!(result.len(), 1);
        assert_eq!(result.context, "Q: What is the refund policy?\nA: Returns within 30 days.");
    }

    #[test]
    fn test_all_method_without_cap() {
        let retriever = Retriever::default();
        let kb = faq();
        let result = retriever.retrieve("anything", &kb, SelectionMethod::All, None);
        assert_eq!(result.context, kb.format_context(None));
    }
}
