//! Manual divider handling.

use regex::Regex;
use std::sync::OnceLock;

/// Runs of three or more `_`, `*` or `-`, plus any newlines right after.
static DIVIDER: OnceLock<Regex> = OnceLock::new();

fn divider_regex() -> &'static Regex {
    DIVIDER.get_or_init(|| {
        Regex::new(r"_{3,}\n*|\*{3,}\n*|-{3,}\n*").expect("divider pattern should compile")
    })
}

/// Split `text` at every manual divider and trim each segment.
///
/// Empty segments are kept (the planner counts them in its estimate and
/// skips them when slicing).
pub fn split_on_dividers(text: &str) -> Vec<&str> {
    divider_regex().split(text).map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_divider() {
        assert_eq!(split_on_dividers("just text"), vec!["just text"]);
    }

    #[test]
    fn test_dash_divider() {
        assert_eq!(split_on_dividers("A\n---\nB"), vec!["A", "B"]);
    }

    #[test]
    fn test_all_divider_styles() {
        let text = "one\n\n___\n\ntwo\n*****\nthree\n----\nfour";
        assert_eq!(
            split_on_dividers(text),
            vec!["one", "two", "three", "four"]
        );
    }

    #[test]
    fn test_two_characters_is_not_a_divider() {
        assert_eq!(split_on_dividers("a -- b"), vec!["a -- b"]);
    }

    #[test]
    fn test_empty_segments_are_kept() {
        assert_eq!(split_on_dividers("---\nA\n---"), vec!["", "A", ""]);
    }

    #[test]
    fn test_divider_mid_line() {
        assert_eq!(split_on_dividers("left***right"), vec!["left", "right"]);
    }
}
