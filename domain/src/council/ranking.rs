//! Strict ranking parser for stage-2 output.
//!
//! Rankers are instructed to answer with a single JSON object:
//!
//! ```json
//! {"final_ranking": ["Response B", "Response A", "Response C"]}
//! ```
//!
//! Anything else — invalid JSON, a wrong key, non-string elements,
//! duplicates, or (when the expected label set is known) a ranking that
//! is not an exact permutation of it — parses to the empty ranking. An
//! empty ranking is a non-vote: the ranker still counts as having
//! answered, it just contributes nothing to aggregation.

use serde::Deserialize;
use std::collections::BTreeSet;

/// Wire schema for a ranking reply.
#[derive(Debug, Deserialize)]
struct RankingDocument {
    final_ranking: Vec<String>,
}

/// Parse a ranker's raw output into an ordered list of labels.
///
/// When `expected_labels` is supplied, the ranking must cover exactly
/// that set — no missing, extra, or foreign labels — so every accepted
/// ranking is a complete, exactly-once ordering of the responses the
/// ranker was actually shown.
///
/// Returns the empty vector on any contract violation.
pub fn parse_ranking(raw: &str, expected_labels: Option<&BTreeSet<String>>) -> Vec<String> {
    let Ok(document) = serde_json::from_str::<RankingDocument>(raw.trim()) else {
        return Vec::new();
    };

    let ranking = document.final_ranking;

    // Reject duplicate labels
    let seen: BTreeSet<&str> = ranking.iter().map(String::as_str).collect();
    if seen.len() != ranking.len() {
        return Vec::new();
    }

    if let Some(expected) = expected_labels {
        if ranking.len() != expected.len() {
            return Vec::new();
        }
        let actual: BTreeSet<String> = ranking.iter().cloned().collect();
        if &actual != expected {
            return Vec::new();
        }
    }

    ranking
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_valid_json_ranking() {
        let text = r#"{"final_ranking": ["Response B", "Response A", "Response C"]}"#;
        assert_eq!(
            parse_ranking(text, None),
            vec!["Response B", "Response A", "Response C"]
        );
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let text = "\n  {\"final_ranking\": [\"Response A\"]}  \n";
        assert_eq!(parse_ranking(text, None), vec!["Response A"]);
    }

    #[test]
    fn test_rejects_non_json() {
        assert_eq!(parse_ranking("not json", None), Vec::<String>::new());
    }

    #[test]
    fn test_rejects_legacy_numbered_list() {
        let text = "FINAL RANKING:\n1. Response A\n2. Response B\n3. Response C";
        assert_eq!(parse_ranking(text, None), Vec::<String>::new());
    }

    #[test]
    fn test_rejects_wrong_key() {
        let text = r#"{"ranking": ["Response B", "Response A"]}"#;
        assert_eq!(parse_ranking(text, None), Vec::<String>::new());
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(
            parse_ranking(r#"["Response A", "Response B"]"#, None),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_rejects_non_string_elements() {
        let text = r#"{"final_ranking": ["Response A", 2]}"#;
        assert_eq!(parse_ranking(text, None), Vec::<String>::new());
    }

    #[test]
    fn test_rejects_duplicates() {
        let text = r#"{"final_ranking": ["Response A", "Response A"]}"#;
        assert_eq!(parse_ranking(text, None), Vec::<String>::new());
    }

    #[test]
    fn test_rejects_empty_text() {
        assert_eq!(parse_ranking("", None), Vec::<String>::new());
    }

    #[test]
    fn test_rejects_partial_against_expected_labels() {
        let text = r#"{"final_ranking": ["Response A", "Response B"]}"#;
        let expected = labels(&["Response A", "Response B", "Response C"]);
        assert_eq!(parse_ranking(text, Some(&expected)), Vec::<String>::new());
    }

    #[test]
    fn test_rejects_extra_against_expected_labels() {
        let text = r#"{"final_ranking": ["Response A", "Response B", "Response C"]}"#;
        let expected = labels(&["Response A", "Response B"]);
        assert_eq!(parse_ranking(text, Some(&expected)), Vec::<String>::new());
    }

    #[test]
    fn test_rejects_foreign_label_of_same_length() {
        let text = r#"{"final_ranking": ["Response A", "Response D"]}"#;
        let expected = labels(&["Response A", "Response B"]);
        assert_eq!(parse_ranking(text, Some(&expected)), Vec::<String>::new());
    }

    #[test]
    fn test_accepts_exact_permutation_unchanged() {
        let text = r#"{"final_ranking": ["Response C", "Response A", "Response B"]}"#;
        let expected = labels(&["Response A", "Response B", "Response C"]);
        assert_eq!(
            parse_ranking(text, Some(&expected)),
            vec!["Response C", "Response A", "Response B"]
        );
    }

    #[test]
    fn test_accepts_multi_letter_labels() {
        let text = r#"{"final_ranking": ["Response AA", "Response B", "Response Z"]}"#;
        let expected = labels(&["Response AA", "Response B", "Response Z"]);
        assert_eq!(
            parse_ranking(text, Some(&expected)),
            vec!["Response AA", "Response B", "Response Z"]
        );
    }
}
