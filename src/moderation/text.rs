//! Keyword screen over listing text

use super::Verdict;

/// Substrings that reject a listing outright. Matching is plain substring
/// search over the lower-cased text, in this order.
pub const DENYLIST: &[&str] = &[
    "sex", "porn", "xxx", "adult", "nude", "naked", "gambling", "casino", "bet", "betting",
    "viagra", "cialis", "drug", "cocaine", "heroin", "weed", "kill", "murder", "terrorist",
    "bomb", "suicide", "obscene", "offensive",
];

pub const TEXT_REJECT_CONFIDENCE: f64 = 0.9;
pub const TEXT_PASS_CONFIDENCE: f64 = 1.0;

/// First denylisted keyword found in `title + " " + description`
pub fn find_keyword(title: &str, description: &str) -> Option<&'static str> {
    let text = format!("{} {}", title, description).to_lowercase();
    DENYLIST.iter().copied().find(|kw| text.contains(kw))
}

pub fn moderate_text(title: &str, description: &str) -> Verdict {
    match find_keyword(title, description) {
        Some(kw) => Verdict::reject(
            TEXT_REJECT_CONFIDENCE,
            format!("Contains inappropriate keyword: {}", kw),
        ),
        None => Verdict::approve(TEXT_PASS_CONFIDENCE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_passes() {
        let v = moderate_text("Desk lamp", "Warm white light, barely used");
        assert!(v.approved);
        assert_eq!(v.confidence, 1.0);
        assert!(v.reason.is_none());
    }

    #[test]
    fn test_keyword_rejects_case_insensitive() {
        let v = moderate_text("CASINO chips", "full set");
        assert!(!v.approved);
        assert_eq!(v.confidence, 0.9);
        assert_eq!(
            v.reason.as_deref(),
            Some("Contains inappropriate keyword: casino")
        );
    }

    #[test]
    fn test_substring_match_in_description() {
        // "bet" sits inside "alphabet": substring semantics reject it
        assert_eq!(find_keyword("Poster", "alphabet chart"), Some("bet"));
    }

    #[test]
    fn test_first_keyword_in_list_order_wins() {
        // "adult" precedes "bomb" in the list regardless of text position
        assert_eq!(find_keyword("bomb", "adult"), Some("adult"));
    }
}
