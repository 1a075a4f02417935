//! Class-list parsing for the upload form
//!
//! The form takes a comma-separated list of free-text class names.
//! Whitespace runs inside a name collapse to a single space and empty
//! entries are dropped, so `" red  car ,, dog "` becomes
//! `["red car", "dog"]`.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn clean_spaces(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Split a raw comma-separated class list into cleaned, non-empty names.
pub fn parse_class_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(clean_spaces)
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_spaces_collapses_runs() {
        assert_eq!(clean_spaces("  red \t car  "), "red car");
        assert_eq!(clean_spaces("dog"), "dog");
        assert_eq!(clean_spaces("   "), "");
    }

    #[test]
    fn test_parse_simple_list() {
        assert_eq!(
            parse_class_list("ball, car, person"),
            vec!["ball", "car", "person"]
        );
    }

    #[test]
    fn test_parse_drops_empty_entries() {
        assert_eq!(parse_class_list("ball,, ,car"), vec!["ball", "car"]);
        assert!(parse_class_list("").is_empty());
        assert!(parse_class_list(" , ,").is_empty());
    }

    #[test]
    fn test_parse_preserves_case_and_inner_words() {
        assert_eq!(
            parse_class_list("Red  Car, traffic   light"),
            vec!["Red Car", "traffic light"]
        );
    }
}
