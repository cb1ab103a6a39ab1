//! Recovery tiers used when a primary summarization path fails.

use std::collections::HashSet;

use super::selection::FOCUS_HEADER;

/// Candidates at or below this many characters are ignored by keyword extraction.
const MIN_KEYWORD_SENTENCE_CHARS: usize = 30;

/// Keyword extraction keeps scanning until this many sentences are accepted.
const MIN_KEYWORD_SENTENCES: usize = 30;

/// Truncation keeps a trailing period only when it falls in the last 20% of the window.
const TRUNCATION_PERIOD_WINDOW: f64 = 0.8;

const SEPARATOR: &str = ". ";

/// Pick sentences by the fraction of query words they contain.
///
/// Sentences come from a plain `". "` split, so the output is cheap and approximate. Zero-score
/// sentences are never accepted, and the emitted text (header included) stays under
/// `target_chars`.
pub fn keyword_extraction(text: &str, query: &str, target_chars: usize) -> String {
    let query_words: HashSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut scored: Vec<(f64, &str)> = text
        .split(SEPARATOR)
        .filter(|sentence| sentence.chars().count() > MIN_KEYWORD_SENTENCE_CHARS)
        .map(|sentence| {
            let words: HashSet<String> = sentence
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            let score = if query_words.is_empty() {
                0.0
            } else {
                query_words.intersection(&words).count() as f64 / query_words.len() as f64
            };
            (score, sentence)
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    // The header and the ". " separators count against the budget too.
    let header = format!("{FOCUS_HEADER} {query}\n\n");
    let mut selected: Vec<&str> = Vec::new();
    let mut total_chars = header.chars().count();
    for (score, sentence) in scored {
        let separator = if selected.is_empty() { 0 } else { SEPARATOR.len() };
        let cost = sentence.chars().count() + separator;
        if total_chars + cost < target_chars && score > 0.0 {
            selected.push(sentence);
            total_chars += cost;
        } else if selected.len() >= MIN_KEYWORD_SENTENCES {
            break;
        }
    }

    tracing::debug!(
        selected = selected.len(),
        total_chars,
        "Keyword extraction finished"
    );
    header + &selected.join(SEPARATOR)
}

/// Cut `text` to `target_chars`, preferring to end on a period near the end of the window.
///
/// Text that already fits is returned unchanged. Otherwise the last `.` inside the window is kept
/// when it lies past 80% of the budget; failing that the window is returned with `...` appended.
pub fn intelligent_truncation(text: &str, target_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(target_chars) else {
        return text.to_string();
    };
    let truncated = &text[..cut];

    if let Some(period) = truncated.rfind('.') {
        let period_chars = truncated[..period].chars().count();
        if period_chars as f64 > target_chars as f64 * TRUNCATION_PERIOD_WINDOW {
            return text[..=period].to_string();
        }
    }
    format!("{truncated}...")
}
