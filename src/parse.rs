//! Defensive parsing of free-text LLM responses.
//!
//! The provider guarantees nothing about the shape of its answer, so every
//! parser here is total: expected structure is recovered when present, and
//! anything else falls back to the raw text. Callers get a tagged
//! [`ParseOutcome`] and must handle the fallback explicitly.

use crate::model::email::Category;

/// Result of parsing structure out of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    /// The expected structure was recognized.
    Parsed(T),
    /// The response did not match; the raw text is preserved for the
    /// analysis log.
    Raw(String),
}

impl<T> ParseOutcome<T> {
    /// The parsed value, if any.
    pub fn value(self) -> Option<T> {
        match self {
            ParseOutcome::Parsed(v) => Some(v),
            ParseOutcome::Raw(_) => None,
        }
    }
}

/// Strip markdown code fences (```json … ```) the provider likes to wrap
/// answers in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Match a response against the fixed category set, case-insensitively.
///
/// The first label found anywhere in the text wins, so "It's Spam." parses
/// as `Spam`. `To-Do` also matches without the hyphen. Anything
/// unrecognized is returned raw.
pub fn parse_category(text: &str) -> ParseOutcome<Category> {
    let cleaned = strip_code_fences(text);
    let lower = cleaned.to_lowercase();

    for category in Category::ALL {
        if lower.contains(&category.label().to_lowercase()) {
            return ParseOutcome::Parsed(category);
        }
    }
    // Accept "todo" / "to do" spellings for To-Do
    if lower.contains("todo") || lower.contains("to do") {
        return ParseOutcome::Parsed(Category::Todo);
    }

    ParseOutcome::Raw(cleaned)
}

/// Split a response into ordered action-item strings.
///
/// Tries a JSON string array first, then falls back to one item per
/// non-empty line with list markers (`-`, `*`, `•`, `1.`, `1)`) stripped.
/// Unparseable or empty output yields an empty vec, never an error.
pub fn parse_action_items(text: &str) -> Vec<String> {
    let cleaned = strip_code_fences(text);

    if cleaned.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(&cleaned) {
            return items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    cleaned
        .lines()
        .map(strip_list_marker)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Remove a leading bullet or `1.` / `1)` numbering from a line.
fn strip_list_marker(line: &str) -> String {
    let trimmed = line.trim().trim_start_matches(['-', '*', '•', '\t']).trim_start();

    // Numbered markers: digits followed by '.' or ')'
    let digits: usize = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim().to_string();
        }
    }

    trimmed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_exact() {
        assert_eq!(parse_category("Spam"), ParseOutcome::Parsed(Category::Spam));
        assert_eq!(
            parse_category("newsletter"),
            ParseOutcome::Parsed(Category::Newsletter)
        );
    }

    #[test]
    fn test_parse_category_embedded_in_sentence() {
        assert_eq!(
            parse_category("This email is Important because of the deadline."),
            ParseOutcome::Parsed(Category::Important)
        );
    }

    #[test]
    fn test_parse_category_todo_spellings() {
        assert_eq!(parse_category("To-Do"), ParseOutcome::Parsed(Category::Todo));
        assert_eq!(parse_category("todo"), ParseOutcome::Parsed(Category::Todo));
        assert_eq!(
            parse_category("looks like a to do item"),
            ParseOutcome::Parsed(Category::Todo)
        );
    }

    #[test]
    fn test_parse_category_unrecognized_is_raw() {
        let out = parse_category("Promotional offer, maybe?");
        assert_eq!(
            out,
            ParseOutcome::Raw("Promotional offer, maybe?".to_string())
        );
        assert!(out.value().is_none());
    }

    #[test]
    fn test_parse_category_strips_fences() {
        assert_eq!(
            parse_category("```json\n\"Spam\"\n```"),
            ParseOutcome::Parsed(Category::Spam)
        );
    }

    #[test]
    fn test_parse_action_items_numbered() {
        let items = parse_action_items("1. Reply to client\n2. Send invoice");
        assert_eq!(items, vec!["Reply to client", "Send invoice"]);
    }

    #[test]
    fn test_parse_action_items_bullets() {
        let items = parse_action_items("- Approve budget\n• Call Bob\n* Book room");
        assert_eq!(items, vec!["Approve budget", "Call Bob", "Book room"]);
    }

    #[test]
    fn test_parse_action_items_json_array() {
        let items = parse_action_items("```json\n[\"task 1\", \"task 2\"]\n```");
        assert_eq!(items, vec!["task 1", "task 2"]);
    }

    #[test]
    fn test_parse_action_items_paren_numbering() {
        let items = parse_action_items("1) Prepare slides\n2) Send agenda");
        assert_eq!(items, vec!["Prepare slides", "Send agenda"]);
    }

    #[test]
    fn test_parse_action_items_empty_input() {
        assert!(parse_action_items("").is_empty());
        assert!(parse_action_items("   \n  \n").is_empty());
    }

    #[test]
    fn test_parse_action_items_malformed_json_falls_back_to_lines() {
        // Not valid JSON — treated as plain lines instead.
        let items = parse_action_items("[broken json\nsecond line");
        assert_eq!(items, vec!["[broken json", "second line"]);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("plain"), "plain");
    }
}
