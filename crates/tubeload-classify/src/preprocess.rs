//! Input shaping shared by both classifiers.

/// Whitespace tokens kept per comment before classification.
pub const MAX_WORDS: usize = 400;

/// Keep the first `max_words` whitespace-separated tokens of `text`, joined
/// by single spaces.
///
/// Both classifiers receive the same truncated text, so their outputs line
/// up with the same comment.
#[must_use]
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_normalised_but_not_cut() {
        assert_eq!(truncate_words("  hello\n\tworld  ", MAX_WORDS), "hello world");
    }

    #[test]
    fn long_text_keeps_first_words() {
        let text = (0..1000).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let truncated = truncate_words(&text, MAX_WORDS);
        let words: Vec<&str> = truncated.split(' ').collect();
        assert_eq!(words.len(), 400);
        assert_eq!(words[0], "w0");
        assert_eq!(words[399], "w399");
    }

    #[test]
    fn empty_and_blank_become_empty() {
        assert_eq!(truncate_words("", MAX_WORDS), "");
        assert_eq!(truncate_words("   \n", MAX_WORDS), "");
    }
}
