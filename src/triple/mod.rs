//! Triple parsing and structural validation
//!
//! Oracle output is one candidate triple per line, in the form
//! `"Subject"|"Relation"|"Object"`. This module normalizes delimiter
//! spacing, splits lines into fields, and applies the structural validity
//! predicate. Malformed lines are classified, never raised — the pipeline
//! routes them to the quarantine ledger.

pub mod pronoun;

/// A structurally valid subject-relation-object assertion.
///
/// Created from one line of oracle output. Validity here is purely
/// structural: three fields, none empty or the literal `null` after
/// trimming and case-folding. Whether the assertion is semantically
/// true is not this type's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Fact {
    /// Parse one oracle output line into a fact.
    ///
    /// Returns `None` when the line fails the validity predicate.
    pub fn parse_line(line: &str) -> Option<Fact> {
        let fields = split_fields(line);
        if !is_valid(&fields) {
            return None;
        }
        let mut it = fields.into_iter();
        Some(Fact {
            subject: it.next().unwrap_or_default(),
            relation: it.next().unwrap_or_default(),
            object: it.next().unwrap_or_default(),
        })
    }

    /// Canonical ledger rendering: `"Subject"|"Relation"|"Object"`.
    pub fn render(&self) -> String {
        format!("\"{}\"|\"{}\"|\"{}\"", self.subject, self.relation, self.object)
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Canonicalize the three known delimiter-spacing variants to `"|"`.
pub fn normalize_line(line: &str) -> String {
    line.replace("\" | \"", "\"|\"")
        .replace("\" |\"", "\"|\"")
        .replace("\"| \"", "\"|\"")
}

/// Normalize a line, strip one enclosing quote pair, and split on the
/// canonical `"|"` separator.
///
/// The result is a field list; callers decide validity with [`is_valid`].
pub fn split_fields(line: &str) -> Vec<String> {
    let normalized = normalize_line(line);
    let mut trimmed = normalized.trim();
    if let Some(rest) = trimmed.strip_prefix('"') {
        trimmed = rest;
    }
    if let Some(rest) = trimmed.strip_suffix('"') {
        trimmed = rest;
    }
    trimmed.split("\"|\"").map(str::to_string).collect()
}

/// The structural validity predicate.
///
/// True iff exactly three fields and no trimmed, lowercased field is
/// empty or the literal `null`.
pub fn is_valid(fields: &[String]) -> bool {
    if fields.len() != 3 {
        return false;
    }
    fields.iter().all(|f| {
        let val = f.trim().to_lowercase();
        !val.is_empty() && val != "null"
    })
}
