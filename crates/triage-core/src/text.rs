//! Request text normalization and keyword matching

/// Lowercase, trim, and collapse runs of whitespace
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count occurrences of `term` that start on a word boundary.
///
/// "test" counts in "testing" but "ui" does not count in "build".
pub(crate) fn count_term(text: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    text.match_indices(term)
        .filter(|(idx, _)| {
            text[..*idx]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric())
        })
        .count()
}

pub(crate) fn contains_term(text: &str, term: &str) -> bool {
    count_term(text, term) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Fix   the\tAUTH\nbug "), "fix the auth bug");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_count_term_word_start() {
        assert_eq!(count_term("testing the test suite", "test"), 2);
        assert_eq!(count_term("build the guide", "ui"), 0);
        assert_eq!(count_term("ui and ux", "ui"), 1);
        assert_eq!(count_term("(docker) docker-compose", "docker"), 2);
    }

    #[test]
    fn test_multi_word_terms() {
        assert!(contains_term("do it step by step please", "step by step"));
        assert!(!contains_term("anything", ""));
    }
}
