//! Sentence segmentation — the NLP collaborator's interface
//!
//! Windowing needs sentence boundaries twice: packing the input and
//! re-splitting each resolved window for overlap trimming. The splitter
//! is a trait so a heavier segmenter can be injected; the default is a
//! punctuation rule that is good enough for well-formed prose.

use regex::Regex;
use std::sync::LazyLock;

/// Splits free text into sentences.
pub trait SentenceSplitter: Send + Sync {
    /// Ordered, trimmed, non-empty sentences.
    fn split(&self, text: &str) -> Vec<String>;
}

// sentence terminator, optional closing quote/paren, then whitespace
static BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?]+["'’)\]]*\s+"#).unwrap());

/// Default punctuation-rule splitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleSplitter;

impl SentenceSplitter for RuleSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for boundary in BOUNDARY_RE.find_iter(text) {
            let sentence = text[start..boundary.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = boundary.end();
        }
        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        sentences
    }
}

/// Sentence count under the default splitter.
pub fn count_sentences(text: &str) -> usize {
    RuleSplitter.split(text).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = RuleSplitter.split("Mary met John. She thanked him! Did he reply?");
        assert_eq!(
            sentences,
            vec!["Mary met John.", "She thanked him!", "Did he reply?"]
        );
    }

    #[test]
    fn unterminated_tail_is_kept() {
        let sentences = RuleSplitter.split("First sentence. trailing fragment");
        assert_eq!(sentences, vec!["First sentence.", "trailing fragment"]);
    }

    #[test]
    fn closing_quotes_stay_with_their_sentence() {
        let sentences = RuleSplitter.split("He said \"stop.\" Then he left.");
        assert_eq!(sentences, vec!["He said \"stop.\"", "Then he left."]);
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        assert!(RuleSplitter.split("   \n ").is_empty());
        assert_eq!(count_sentences(""), 0);
    }

    #[test]
    fn counts_match_split_length() {
        let text = "One. Two. Three.";
        assert_eq!(count_sentences(text), 3);
    }
}
