//! Size-bounded views of a transcript.
//!
//! Prompts have a size budget, so long transcripts are either split on line
//! boundaries and narrowed to the most relevant chunk, or trimmed in the
//! middle.

mod lines;
mod relevance;

pub use lines::chunk_transcript;
pub use relevance::select_best_chunk;

/// Marker inserted where the middle of a long text was dropped.
pub const MIDDLE_TRIMMED: &str = "\n\n[...middle trimmed...]\n\n";

/// Keep the head and tail of `text` when it exceeds `max_chars` characters.
///
/// The result holds `max_chars / 2` characters from each end around
/// [`MIDDLE_TRIMMED`].
pub fn truncate_middle(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }

    let half = max_chars / 2;
    let head: String = text.chars().take(half).collect();
    let tail: String = text.chars().skip(total - half).collect();
    format!("{}{}{}", head, MIDDLE_TRIMMED, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_middle_short_text_untouched() {
        assert_eq!(truncate_middle("abc", 3), "abc");
        assert_eq!(truncate_middle("", 0), "");
    }

    #[test]
    fn test_truncate_middle_keeps_both_ends() {
        let text = format!("{}{}{}", "h".repeat(10), "m".repeat(100), "t".repeat(10));
        let truncated = truncate_middle(&text, 20);
        assert_eq!(truncated, format!("{}{}{}", "h".repeat(10), MIDDLE_TRIMMED, "t".repeat(10)));
    }

    #[test]
    fn test_truncate_middle_multibyte() {
        let text = "ü".repeat(30);
        let truncated = truncate_middle(&text, 10);
        assert!(truncated.starts_with(&"ü".repeat(5)));
        assert!(truncated.ends_with(&"ü".repeat(5)));
    }
}
