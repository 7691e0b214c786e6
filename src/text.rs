//! Lexical helpers shared by the checkers: tokenizing, vocabulary lookups,
//! markdown section extraction and truncation.

use std::collections::HashSet;

/// Lowercase `text` and split it on runs of non-word characters
/// (anything other than ASCII letters, digits and `_`).
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Tokens longer than `min_len` characters.
pub fn significant_tokens(text: &str, min_len: usize) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| t.chars().count() > min_len)
        .collect()
}

pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// True if `haystack` (already lowercased) contains any of `needles` as a substring.
pub fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// The subset of `needles` that occur in `haystack` (already lowercased).
pub fn mentioned<'a>(haystack: &str, needles: &[&'a str]) -> Vec<&'a str> {
    needles
        .iter()
        .copied()
        .filter(|n| haystack.contains(n))
        .collect()
}

/// Body of the markdown section whose heading line starts with `## {heading}`
/// (case-insensitive), up to the next `##` heading or end of text.
pub fn markdown_section<'a>(markdown: &'a str, heading: &str) -> Option<&'a str> {
    let marker = format!("## {}", heading.to_lowercase());
    let mut offset = 0;
    let mut start = None;

    for line in markdown.split_inclusive('\n') {
        let trimmed = line.trim_start();
        match start {
            None => {
                if trimmed.to_lowercase().starts_with(&marker) {
                    start = Some(offset + line.len());
                }
            }
            Some(begin) => {
                if trimmed.starts_with("##") {
                    return Some(&markdown[begin..offset]);
                }
            }
        }
        offset += line.len();
    }

    start.map(|begin| &markdown[begin.min(markdown.len())..])
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Like [`truncate_chars`], with a trailing `...` when anything was cut.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    let cut = truncate_chars(text, max_chars);
    if cut.len() < text.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_non_word_runs() {
        assert_eq!(
            tokenize("Add a Login-page, with user_id!"),
            vec!["add", "a", "login", "page", "with", "user_id"]
        );
    }

    #[test]
    fn significant_tokens_drops_short_words() {
        assert_eq!(
            significant_tokens("add the login page today", 3),
            vec!["login", "page", "today"]
        );
    }

    #[test]
    fn mentioned_lists_matches_in_order() {
        let text = "use a factory and an event bus";
        assert_eq!(mentioned(text, &["event bus", "factory", "observer"]), vec!["event bus", "factory"]);
        assert!(mentions_any(text, &["observer", "factory"]));
        assert!(!mentions_any(text, &["observer"]));
    }

    #[test]
    fn markdown_section_stops_at_next_heading() {
        let doc = "# Title\n\n## Anti-patterns\n\n- global state\n- god objects\n\n## Other\nstuff\n";
        let section = markdown_section(doc, "anti-patterns").unwrap();
        assert!(section.contains("global state"));
        assert!(section.contains("god objects"));
        assert!(!section.contains("stuff"));
    }

    #[test]
    fn markdown_section_runs_to_end() {
        let doc = "## Current scope\nlogin page\n";
        assert_eq!(markdown_section(doc, "Current Scope"), Some("login page\n"));
        assert_eq!(markdown_section(doc, "Current priorities"), None);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 5), "hi");
        assert_eq!(ellipsize("abcdef", 3), "abc...");
        assert_eq!(ellipsize("abc", 3), "abc");
    }
}
