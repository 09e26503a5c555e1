//! Utterance text normalization.
//!
//! Embedding quality degrades on transcripts full of recognizer artifacts
//! (stray newlines, doubled periods, dangling punctuation), so every piece
//! of text is canonicalized before it is embedded.

use regex::Regex;
use std::sync::OnceLock;

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"))
}

/// Canonicalize raw utterance text before embedding.
///
/// Collapses whitespace runs (including newlines) to single spaces, trims,
/// removes the literal `". ,"` artifact, and collapses doubled periods.
/// Guaranteed idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_string();
    // Each pass can expose new artifacts (removing ". ," may join two
    // spaces), so run to a fixed point.
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(text: &str) -> String {
    let collapsed = whitespace_regex().replace_all(text, " ");
    collapsed
        .trim()
        .replace(". ,", "")
        .replace("..", ".")
        .replace(". .", ".")
        .trim()
        .to_string()
}
