//! Budgeted greedy sentence selection.

use super::redundancy::is_too_similar;
use super::types::{ScoredSentence, Sentence, SummarizerSettings};

/// Header line that opens every query-focused summary.
pub const FOCUS_HEADER: &str = "SUMMARY FOCUSED ON:";

/// Token budget and the ratio used to convert it into characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBudget {
    /// Token budget for the produced text.
    pub max_tokens: usize,
    /// Tokens per character.
    pub token_char_ratio: f64,
}

impl SelectionBudget {
    /// Pair a token budget with its conversion ratio.
    pub fn new(max_tokens: usize, token_char_ratio: f64) -> Self {
        Self {
            max_tokens,
            token_char_ratio,
        }
    }

    /// Character budget, `floor(max_tokens / token_char_ratio)`.
    pub fn target_chars(&self) -> usize {
        if self.token_char_ratio <= 0.0 {
            return 0;
        }
        (self.max_tokens as f64 / self.token_char_ratio).floor() as usize
    }
}

/// Greedily pick sentences by score under a character budget, then restore document order.
///
/// Candidates are visited best first (earlier index wins ties). A candidate is accepted when it
/// still fits the budget and is not redundant with the recent accepted window. Selection ends
/// once `max_selected_sentences` are accepted or the budget is `budget_fill_ratio` full.
pub fn select(
    mut scored: Vec<ScoredSentence>,
    target_chars: usize,
    settings: &SummarizerSettings,
) -> Vec<Sentence> {
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.sentence.index.cmp(&b.sentence.index))
    });

    let fill_limit = target_chars as f64 * settings.budget_fill_ratio;
    let mut selected: Vec<Sentence> = Vec::new();
    let mut total_chars = 0usize;

    for candidate in scored {
        let length = candidate.sentence.char_len();
        if total_chars + length > target_chars {
            continue;
        }
        if is_too_similar(
            &candidate.sentence.text,
            &selected,
            settings.redundancy_window,
            settings.redundancy_threshold,
        ) {
            continue;
        }

        total_chars += length;
        selected.push(candidate.sentence);
        if selected.len() >= settings.max_selected_sentences || total_chars as f64 >= fill_limit {
            break;
        }
    }

    tracing::debug!(
        selected = selected.len(),
        total_chars,
        target_chars,
        "Selected sentences"
    );
    selected.sort_by_key(|sentence| sentence.index);
    selected
}

/// Render selected sentences under the focus header.
pub fn format_focused(query: &str, sentences: &[Sentence]) -> String {
    let mut parts = Vec::with_capacity(sentences.len() + 1);
    parts.push(format!("{FOCUS_HEADER} {query}\n"));
    parts.extend(sentences.iter().map(|sentence| sentence.text.clone()));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(text: &str, index: usize, score: f64) -> ScoredSentence {
        ScoredSentence {
            sentence: Sentence::new(text, index),
            score,
        }
    }

    #[test]
    fn default_budget_is_about_26k_chars() {
        assert_eq!(SelectionBudget::new(8000, 0.3).target_chars(), 26666);
    }

    #[test]
    fn small_budget_allows_at_most_one_overrun() {
        let sentences: Vec<ScoredSentence> = (0..6)
            .map(|i| {
                let text = format!("{:<39}.", format!("Sentence {i} about topic {}", i * 7));
                scored(&text, i, 1.0 - i as f64 * 0.1)
            })
            .collect();
        assert!(sentences.iter().all(|s| s.sentence.char_len() == 40));

        let picked = select(sentences, 100, &SummarizerSettings::default());
        assert!(picked.len() <= 3);
        let total: usize = picked.iter().map(Sentence::char_len).sum();
        assert!(total <= 140);
    }

    #[test]
    fn output_restores_document_order() {
        let picked = select(
            vec![
                scored("Third sentence talks about tides", 2, 0.9),
                scored("First sentence covers the wind", 0, 0.5),
                scored("Second sentence discusses sunlight", 1, 0.7),
            ],
            1000,
            &SummarizerSettings::default(),
        );
        let indices: Vec<usize> = picked.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn ties_prefer_earlier_sentences() {
        let settings = SummarizerSettings {
            max_selected_sentences: 1,
            ..Default::default()
        };
        let picked = select(
            vec![
                scored("Later sentence with equal score", 4, 0.5),
                scored("Earlier sentence with equal score", 1, 0.5),
            ],
            1000,
            &settings,
        );
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].index, 1);
    }

    #[test]
    fn redundant_candidates_are_skipped() {
        let picked = select(
            vec![
                scored("the grid stores solar energy for later use", 0, 0.9),
                scored("The grid stores solar energy for later use", 1, 0.8),
                scored("Wind turbines spin faster in winter storms", 2, 0.7),
            ],
            1000,
            &SummarizerSettings::default(),
        );
        let indices: Vec<usize> = picked.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn selection_caps_sentence_count() {
        let sentences = (0..60)
            .map(|i| scored(&format!("unique token{i} sentence body"), i, 1.0))
            .collect();
        let picked = select(sentences, 1_000_000, &SummarizerSettings::default());
        assert_eq!(picked.len(), 40);
    }

    #[test]
    fn focused_output_has_header_line() {
        let text = format_focused(
            "climate",
            &[Sentence::new("One.", 0), Sentence::new("Two.", 1)],
        );
        assert_eq!(text, "SUMMARY FOCUSED ON: climate\n One. Two.");
    }
}
