//! Pronoun gate — detects unresolved references in extracted triples
//!
//! A fixed closed set of English personal and relative pronouns. The gate
//! tokenizes a subject or object span on word boundaries (keeping internal
//! apostrophes, ampersands, and hyphens inside a token), lower-cases each
//! token, and tests membership. One match anywhere in a segment's output
//! batch escalates the whole segment.

use regex::Regex;
use std::sync::LazyLock;

use super::split_fields;

/// First/second/third-person and relative pronouns, lowercase.
const PRONOUNS: &[&str] = &[
    "i", "me", "myself", "my", "mine",
    "he", "him", "himself", "his",
    "she", "her", "herself", "hers",
    "it", "itself", "its",
    "they", "them", "themselves", "themself", "their", "theirs",
    "who", "whom", "whose",
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w&'’-]+\b").unwrap());

/// True if any word-boundary token in the span is a pronoun.
pub fn contains_pronoun(span: &str) -> bool {
    WORD_RE
        .find_iter(span)
        .any(|m| PRONOUNS.contains(&m.as_str().to_lowercase().as_str()))
}

/// Gate over a segment's entire raw oracle output.
///
/// Scans every line, leniently accepting any line that splits into at
/// least three fields, and tests the subject and object spans. A single
/// offending line triggers escalation for the whole segment.
pub fn output_needs_escalation(raw_output: &str) -> bool {
    raw_output.lines().any(|line| {
        let fields = split_fields(line);
        fields.len() >= 3 && (contains_pronoun(&fields[0]) || contains_pronoun(&fields[2]))
    })
}
