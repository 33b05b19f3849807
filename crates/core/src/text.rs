/// Case-folds `s`, turns every run of non-alphanumeric characters into a single
/// space, and trims. Descriptions, keywords and questions all go through this so
/// that substring matching agrees on one form.
pub fn normalize_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for ch in s.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// True when `needle` occurs in `haystack` starting and ending on word
/// boundaries. Both sides are expected to be normalized already.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start].chars().next_back().map_or(true, |c| c == ' ');
        let after_ok = haystack[end..].chars().next().map_or(true, |c| c == ' ');
        before_ok && after_ok
    })
}

/// True when `needle` occurs in `haystack` starting on a word boundary. The
/// end is left open so "mcdonald" finds "mcdonalds" and "grocer" finds
/// "groceries".
pub fn contains_word_prefix(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack
        .match_indices(needle)
        .any(|(start, _)| haystack[..start].chars().next_back().map_or(true, |c| c == ' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_text("  NETFLIX.COM  "), "netflix com");
    }

    #[test]
    fn collapses_punctuation_and_whitespace() {
        assert_eq!(normalize_text("WHOLE   FOODS #123 -- Austin, TX"), "whole foods 123 austin tx");
        assert_eq!(normalize_text("AMZN*Mktp"), "amzn mktp");
    }

    #[test]
    fn empty_and_symbol_only() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" *** "), "");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(normalize_text("Café Müller"), "café müller");
    }

    #[test]
    fn phrase_requires_word_boundaries() {
        assert!(contains_phrase("paid rent today", "rent"));
        assert!(contains_phrase("rent", "rent"));
        assert!(!contains_phrase("spend this current month", "rent"));
        assert!(contains_phrase("my whole foods trip", "whole foods"));
        assert!(!contains_phrase("anything", ""));
    }

    #[test]
    fn word_prefix_leaves_the_end_open() {
        assert!(contains_word_prefix("spend at mcdonalds in july", "mcdonald"));
        assert!(contains_word_prefix("how much on groceries", "grocer"));
        assert!(contains_word_prefix("paid rent", "rent"));
        assert!(!contains_word_prefix("spend this current month", "rent"));
        assert!(!contains_word_prefix("anything", ""));
    }
}
