//! Knowledge source parser.
//!
//! Turns semi-structured markdown into ordered [`QAEntry`] values:
//! heading lines are dropped, each `Q:` marker at the start of a line opens an
//! entry, the first `A:` marker inside it starts the answer, and the answer
//! runs up to the next `Q:` marker or the end of input.

use helpdesk_core::{KnowledgeBase, QAEntry, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn question_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*\*{0,2}Q:\*{0,2}").expect("valid question marker"))
}

fn answer_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*\*{0,2}A:\*{0,2}").expect("valid answer marker"))
}

/// Emphasis and code markup, stripped in this order.
fn markup_patterns() -> &'static [Regex; 4] {
    static RE: OnceLock<[Regex; 4]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"\*\*(.+?)\*\*").expect("valid bold pattern"),
            Regex::new(r"__(.+?)__").expect("valid underline bold pattern"),
            Regex::new(r"\*([^*]+)\*").expect("valid italic pattern"),
            Regex::new(r"`([^`]*)`").expect("valid code pattern"),
        ]
    })
}

/// Parse source text into a knowledge base.
///
/// Fails with `NoEntriesParsed` when nothing usable is found, including for
/// empty input.
pub fn parse_knowledge_base(source: &str, source_name: &str) -> Result<KnowledgeBase> {
    let entries = parse_entries(source);
    debug!("Parsed {} entries from {}", entries.len(), source_name);
    KnowledgeBase::new(entries, source_name)
}

/// Extract every complete question/answer pair, in source order.
pub fn parse_entries(source: &str) -> Vec<QAEntry> {
    let body = strip_headings(source);
    let markers: Vec<_> = question_marker().find_iter(&body).collect();
    let mut entries = Vec::with_capacity(markers.len());

    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map(|m| m.start()).unwrap_or(body.len());
        let block = &body[marker.end()..end];

        let Some(answer) = answer_marker().find(block) else {
            debug!("Skipping question without answer at byte {}", marker.start());
            continue;
        };

        let question = normalize_text(&block[..answer.start()]);
        let answer = normalize_text(&block[answer.end()..]);
        if question.is_empty() || answer.is_empty() {
            continue;
        }

        entries.push(QAEntry::new(question, answer, entries.len()));
    }

    entries
}

/// Collapse whitespace and strip emphasis/code markup.
///
/// Stripping repeats until nothing changes, so unpaired delimiters cannot
/// pair up differently on a later pass. Normalizing already normalized text
/// returns it unchanged.
pub fn normalize_text(text: &str) -> String {
    let mut out = collapse_whitespace(text);
    loop {
        let next = strip_markup(&out);
        if next == out {
            return out;
        }
        out = next;
    }
}

fn strip_markup(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in markup_patterns() {
        out = pattern.replace_all(&out, "${1}").into_owned();
    }
    collapse_whitespace(&out)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_headings(source: &str) -> String {
    source
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}
