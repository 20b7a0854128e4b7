//! Similarity scoring used for recall ranking.

use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "at", "be", "do", "does", "for", "from", "i", "in", "is", "it", "me",
    "my", "of", "on", "or", "the", "to", "was", "what", "when", "where", "which", "who", "with",
    "you",
];

/// Lowercased content tokens with stopwords removed.
///
/// `-` and `:` stay inside tokens so dates and clock times survive intact.
pub(crate) fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|ch: char| !(ch.is_alphanumeric() || ch == '-' || ch == ':'))
        .map(|token| token.trim_matches(|ch| ch == '-' || ch == ':'))
        .filter(|token| !token.is_empty() && !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Fraction of query tokens present in the content, in `[0, 1]`.
pub(crate) fn text_score(query: &HashSet<String>, content: &str) -> f32 {
    if query.is_empty() {
        return 0.0;
    }
    let content = tokenize(content);
    let hits = query
        .iter()
        .filter(|token| content.contains(*token))
        .count();
    hits as f32 / query.len() as f32
}

/// Cosine similarity; zero for mismatched or degenerate vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::{cosine_similarity, text_score, tokenize};
    use pretty_assertions::assert_eq;

    #[test]
    fn tokenize_keeps_dates_and_times() {
        let tokens = tokenize("Schedule: Meeting with John on 2024-08-25 at 14:00.");
        for expected in ["schedule", "meeting", "john", "2024-08-25", "14:00"] {
            assert!(tokens.contains(expected), "missing {expected}");
        }
        assert!(!tokens.contains("with"));
        assert!(!tokens.contains("schedule:"));
    }

    #[test]
    fn text_score_counts_query_overlap() {
        let query = tokenize("When is my next meeting with John?");
        let score = text_score(&query, "Schedule: Meeting with John on 2024-08-25");
        assert_eq!(score, 2.0 / 3.0);
        assert_eq!(text_score(&query, "Dentist appointment"), 0.0);
        assert_eq!(text_score(&tokenize("the a"), "anything"), 0.0);
    }

    #[test]
    fn cosine_similarity_handles_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
