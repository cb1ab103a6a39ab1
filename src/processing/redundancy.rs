//! Lexical near-duplicate suppression.

use std::collections::HashSet;

use super::types::Sentence;

/// Lower-cased whitespace-delimited words of `text`.
pub fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard overlap `|a ∩ b| / |a ∪ b|`; zero when either set is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Whether `candidate` overlaps any of the last `window` accepted sentences by more than
/// `threshold`.
pub fn is_too_similar(
    candidate: &str,
    accepted: &[Sentence],
    window: usize,
    threshold: f64,
) -> bool {
    if accepted.is_empty() {
        return false;
    }
    let candidate_words = word_set(candidate);
    let start = accepted.len().saturating_sub(window);
    accepted[start..]
        .iter()
        .any(|sentence| jaccard(&candidate_words, &word_set(&sentence.text)) > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_of_empty_sets_is_zero() {
        let empty = HashSet::new();
        assert_eq!(jaccard(&empty, &empty), 0.0);
        assert_eq!(jaccard(&word_set("solar"), &empty), 0.0);
    }

    #[test]
    fn jaccard_ignores_case() {
        let a = word_set("Solar Power Rises");
        let b = word_set("solar power falls");
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn near_duplicates_are_rejected() {
        let accepted = vec![Sentence::new("the grid stores solar energy for later use", 0)];
        assert!(is_too_similar(
            "The grid stores solar energy for later use",
            &accepted,
            5,
            0.7
        ));
        assert!(!is_too_similar(
            "Wind turbines spin faster in winter storms",
            &accepted,
            5,
            0.7
        ));
    }

    #[test]
    fn only_the_recent_window_is_considered() {
        let mut accepted = vec![Sentence::new("alpha beta gamma delta", 0)];
        for index in 1..=5 {
            accepted.push(Sentence::new(format!("unrelated filler number {index}"), index));
        }
        assert!(!is_too_similar("alpha beta gamma delta", &accepted, 5, 0.7));
        assert!(is_too_similar("alpha beta gamma delta", &accepted, 6, 0.7));
    }
}
