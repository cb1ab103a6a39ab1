//! Sentence filtering and query relevance scoring.

use super::types::{ScoredSentence, Sentence, VectorizeError};
use super::vectorize::TfidfVectorizer;

/// Sentences at or below this many characters are never scored.
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Fewer surviving sentences than this means the text is returned untouched.
pub const MIN_SCORABLE_SENTENCES: usize = 5;

const SKIP_PATTERNS: &[&str] = &[
    "page ",
    "vol.",
    "pp.",
    "doi:",
    "isbn:",
    "issn:",
    "references",
    "bibliography",
    "appendix",
    "figure ",
    "table ",
    "fig.",
    "tab.",
    "copyright",
    "©",
    "â©",
    "all rights reserved",
];

/// Whether a sentence looks like a page header, citation, caption, or mostly non-prose.
pub fn is_header_or_metadata(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    if SKIP_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
        return true;
    }

    let total = sentence.chars().count();
    let alphabetic = sentence.chars().filter(|ch| ch.is_alphabetic()).count();
    (alphabetic as f64) < total as f64 * 0.5
}

/// Keep sentences worth scoring, trimmed, with their original indices.
pub fn filter_sentences(sentences: &[Sentence]) -> Vec<Sentence> {
    sentences
        .iter()
        .filter_map(|sentence| {
            let cleaned = sentence.text.trim();
            (cleaned.chars().count() > MIN_SENTENCE_CHARS && !is_header_or_metadata(cleaned))
                .then(|| Sentence::new(cleaned, sentence.index))
        })
        .collect()
}

/// Blend query similarity with normalised TF-IDF mass for each sentence.
///
/// `score = query_weight * cosine(sentence, query) + (1 - query_weight) * importance / max`.
/// The query is vectorized together with the sentences, as the last row.
pub fn score_against_query(
    sentences: &[Sentence],
    query: &str,
    query_weight: f64,
) -> Result<Vec<ScoredSentence>, VectorizeError> {
    let mut corpus: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
    corpus.push(query);
    let matrix = TfidfVectorizer::default().fit_transform(&corpus)?;
    let query_row = sentences.len();

    let importance: Vec<f64> = (0..sentences.len()).map(|row| matrix.row_sum(row)).collect();
    let max_importance = importance.iter().copied().fold(0.0_f64, f64::max);

    Ok(sentences
        .iter()
        .enumerate()
        .map(|(row, sentence)| {
            let similarity = matrix.cosine(row, query_row);
            let normalized = if max_importance > 0.0 {
                importance[row] / max_importance
            } else {
                0.0
            };
            ScoredSentence {
                sentence: sentence.clone(),
                score: query_weight * similarity + (1.0 - query_weight) * normalized,
            }
        })
        .collect())
}
