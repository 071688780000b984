//! Presentation helpers
//!
//! Pure functions of message content and role; no state lives here.

use once_cell::sync::Lazy;
use regex::Regex;
use reqassist_core::session::ReviewStats;

/// Requirement-token patterns highlighted in user text: requirement ids
/// like `r12` and coordinate pairs like `(3, 4)`.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"r\d+|\(\d+,\s\d+\)").expect("valid token regex"));

/// A piece of user text, either plain or a highlighted token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Token(String),
}

/// Split user text into plain and token segments, preserving order
pub fn split_tokens(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in TOKEN_RE.find_iter(content) {
        if m.start() > last {
            segments.push(Segment::Plain(content[last..m.start()].to_string()));
        }
        segments.push(Segment::Token(m.as_str().to_string()));
        last = m.end();
    }
    if last < content.len() {
        segments.push(Segment::Plain(content[last..].to_string()));
    }

    segments
}

/// One-line summary of a reply's review stats
pub fn stats_line(stats: &ReviewStats) -> String {
    format!(
        "approved {} / in review {} / disapproved {}",
        stats.approved, stats.in_review, stats.disapproved
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_segment() {
        let segments = split_tokens("no tokens here");
        assert_eq!(segments, vec![Segment::Plain("no tokens here".to_string())]);
    }

    #[test]
    fn test_requirement_ids_are_highlighted() {
        let segments = split_tokens("link r12 to r3");
        assert_eq!(
            segments,
            vec![
                Segment::Plain("link ".to_string()),
                Segment::Token("r12".to_string()),
                Segment::Plain(" to ".to_string()),
                Segment::Token("r3".to_string()),
            ]
        );
    }

    #[test]
    fn test_coordinate_pairs_are_highlighted() {
        let segments = split_tokens("move (3, 4) left");
        assert_eq!(
            segments,
            vec![
                Segment::Plain("move ".to_string()),
                Segment::Token("(3, 4)".to_string()),
                Segment::Plain(" left".to_string()),
            ]
        );
    }

    #[test]
    fn test_coordinate_without_space_is_plain() {
        // only "(n, m)" with a single space matches, as in the web UI
        let segments = split_tokens("(3,4)");
        assert_eq!(segments, vec![Segment::Plain("(3,4)".to_string())]);
    }

    #[test]
    fn test_empty_input_yields_no_segments() {
        assert!(split_tokens("").is_empty());
    }

    #[test]
    fn test_stats_line() {
        let stats = ReviewStats {
            approved: 4,
            in_review: 2,
            disapproved: 1,
        };
        assert_eq!(stats_line(&stats), "approved 4 / in review 2 / disapproved 1");
    }
}
