//! Character-limited message splitting.

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Prefers breaking after a newline in the second half of the window, then
/// after a space, then hard-splits. Concatenating the pieces yields `text`.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let window = truncate_chars(remaining, max_chars);
        if window.len() == remaining.len() {
            chunks.push(remaining.to_string());
            break;
        }

        let half = window.len() / 2;
        let end = match window.rfind('\n') {
            Some(pos) if pos >= half => pos + 1,
            _ => match window.rfind(' ') {
                Some(pos) if pos > 0 => pos + 1,
                _ => window.len(),
            },
        };

        chunks.push(remaining[..end].to_string());
        remaining = &remaining[end..];
    }

    chunks
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(chunk_message("hello", 2000), vec!["hello"]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_message("", 10).is_empty());
    }

    #[test]
    fn prefers_newline_break() {
        let text = "aaaaaaa\nbbbbbbbbbb";
        let chunks = chunk_message(text, 10);
        assert_eq!(chunks[0], "aaaaaaa\n");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn falls_back_to_space_break() {
        let chunks = chunk_message("one two three four", 10);
        assert_eq!(chunks[0], "one two ");
        assert_eq!(chunks.concat(), "one two three four");
    }

    #[test]
    fn hard_splits_without_break_points() {
        let chunks = chunk_message(&"x".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[rstest]
    #[case("héllo wörld ünïcode téxt", 7)]
    #[case("🙂🙂🙂🙂🙂🙂🙂🙂🙂", 4)]
    #[case("line one\nline two\nline three\n", 9)]
    fn chunks_respect_limit_and_preserve_text(#[case] text: &str, #[case] max: usize) {
        let chunks = chunk_message(text, max);
        assert!(chunks.iter().all(|c| c.chars().count() <= max));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("🙂🙂🙂", 2), "🙂🙂");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
