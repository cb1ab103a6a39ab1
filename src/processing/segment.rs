//! Sentence boundary detection.
//!
//! The segmenter is rule based and tuned for English prose: a boundary is a run of terminal
//! punctuation (`.`, `!`, `?`, optionally followed by closing quotes or brackets) that is followed
//! by whitespace, or a blank line. Periods are vetoed as boundaries when they close a known
//! abbreviation (`e.g.`, `Fig.`, `et al.`), a single-letter initial, a list enumerator at the start
//! of a line (`1. Smith`), or when the next word starts in lower case.
//!
//! Shared lookup tables are built once per process by [`ensure_ready`]; every entry point calls it,
//! so explicit calls only move the one-time cost to a convenient moment.

use std::collections::HashSet;
use std::sync::OnceLock;

use super::types::Sentence;

const ABBREVIATIONS: &[&str] = &[
    "al", "approx", "apr", "aug", "ave", "blvd", "ca", "cf", "ch", "co", "col", "corp", "dec",
    "dept", "dr", "e.g", "ed", "eds", "eq", "eqs", "est", "feb", "fig", "figs", "gen", "gov",
    "i.e", "inc", "jan", "jr", "jul", "jun", "lt", "ltd", "mr", "mrs", "ms", "mt", "no", "nos",
    "nov", "oct", "pp", "prof", "ref", "refs", "resp", "sec", "sep", "sept", "sr", "st", "tab",
    "u.k", "u.s", "viz", "vol", "vols", "vs",
];

struct SegmenterResources {
    abbreviations: HashSet<&'static str>,
}

static RESOURCES: OnceLock<SegmenterResources> = OnceLock::new();

/// Build the segmenter's lookup tables if this is the first call in the process.
///
/// Repeated calls are cheap no-ops.
pub fn ensure_ready() {
    resources();
}

fn resources() -> &'static SegmenterResources {
    RESOURCES.get_or_init(|| {
        tracing::debug!(
            abbreviations = ABBREVIATIONS.len(),
            "Initializing sentence segmenter"
        );
        SegmenterResources {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
        }
    })
}

/// Split `text` into sentences and pair each with its position in document order.
pub fn segment(text: &str) -> Vec<Sentence> {
    split_sentences(text)
        .into_iter()
        .enumerate()
        .map(|(index, text)| Sentence::new(text, index))
        .collect()
}

/// Split `text` into trimmed sentence strings.
///
/// Returns an empty vector for empty or whitespace-only input.
pub fn split_sentences(text: &str) -> Vec<String> {
    let resources = resources();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start_byte = 0usize;
    let mut start_char = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (offset, ch) = chars[i];

        if ch == '\n' && is_paragraph_break(&chars, i) {
            push_sentence(&mut sentences, &text[start_byte..offset]);
            let mut next = i;
            while next < chars.len() && chars[next].1.is_whitespace() {
                next += 1;
            }
            start_char = next;
            start_byte = byte_offset(text, &chars, next);
            i = next;
            continue;
        }

        if is_terminal(ch) {
            let mut end = i + 1;
            while end < chars.len() && (is_terminal(chars[end].1) || is_closing(chars[end].1)) {
                end += 1;
            }
            let followed_by_space = end == chars.len() || chars[end].1.is_whitespace();
            if followed_by_space && is_boundary(&chars, start_char, i, end, resources) {
                let end_byte = byte_offset(text, &chars, end);
                push_sentence(&mut sentences, &text[start_byte..end_byte]);
                start_byte = end_byte;
                start_char = end;
            }
            i = end;
            continue;
        }

        i += 1;
    }

    push_sentence(&mut sentences, &text[start_byte..]);
    sentences
}

fn byte_offset(text: &str, chars: &[(usize, char)], index: usize) -> usize {
    chars.get(index).map(|(offset, _)| *offset).unwrap_or(text.len())
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

fn is_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…')
}

fn is_closing(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '}' | '”' | '’' | '»')
}

/// A newline followed, after optional horizontal whitespace, by another newline.
fn is_paragraph_break(chars: &[(usize, char)], newline: usize) -> bool {
    chars[newline + 1..]
        .iter()
        .map(|(_, ch)| *ch)
        .take_while(|ch| ch.is_whitespace())
        .any(|ch| ch == '\n')
}

fn is_boundary(
    chars: &[(usize, char)],
    sentence_start: usize,
    terminal: usize,
    run_end: usize,
    resources: &SegmenterResources,
) -> bool {
    if chars[terminal].1 != '.' || (run_end - terminal > 1 && is_terminal(chars[terminal + 1].1)) {
        return true;
    }

    let mut token_start = terminal;
    while token_start > sentence_start && !chars[token_start - 1].1.is_whitespace() {
        token_start -= 1;
    }
    let token: String = chars[token_start..terminal]
        .iter()
        .map(|(_, ch)| *ch)
        .skip_while(|ch| !ch.is_alphanumeric())
        .collect();

    if !token.is_empty() {
        let lower = token.to_lowercase();
        if resources.abbreviations.contains(lower.as_str()) {
            return false;
        }
        let mut letters = token.chars();
        if let (Some(first), None) = (letters.next(), letters.next()) {
            if first.is_alphabetic() {
                return false;
            }
        }
        let at_line_start = token_start == sentence_start || chars[token_start - 1].1 == '\n';
        if at_line_start && token.len() <= 3 && token.chars().all(|ch| ch.is_ascii_digit()) {
            return false;
        }
    }

    let next_word = chars[run_end..]
        .iter()
        .map(|(_, ch)| *ch)
        .find(|ch| !ch.is_whitespace());
    !matches!(next_word, Some(ch) if ch.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_sentences() {
        let sentences = split_sentences("The sun rose. Birds sang loudly! Did anyone notice?");
        assert_eq!(
            sentences,
            vec!["The sun rose.", "Birds sang loudly!", "Did anyone notice?"]
        );
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t  ").is_empty());
        assert!(segment("").is_empty());
    }

    #[test]
    fn abbreviations_and_initials_do_not_split() {
        let sentences = split_sentences(
            "Dr. Smith cited prior work, e.g. the survey by J. Doe. Results were strong.",
        );
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("Dr. Smith"));
        assert_eq!(sentences[1], "Results were strong.");
    }

    #[test]
    fn decimals_and_lowercase_continuations_stay_together() {
        let sentences = split_sentences("Pi is roughly 3.14 in value. The approx. value works.");
        assert_eq!(sentences.len(), 2);

        let sentences = split_sentences("It cost 5 dollars. and then more.");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn reference_entries_form_a_single_sentence() {
        let sentences = split_sentences("References\n1. Smith et al. Climate models.");
        assert_eq!(sentences, vec!["References\n1. Smith et al. Climate models."]);
    }

    #[test]
    fn blank_lines_separate_sentences() {
        let sentences =
            split_sentences("=== notes.txt ===\n\nFirst line without a period\n\nSecond.");
        assert_eq!(
            sentences,
            vec!["=== notes.txt ===", "First line without a period", "Second."]
        );
    }

    #[test]
    fn closing_quotes_stay_with_their_sentence() {
        let sentences = split_sentences("He said \"stop.\" Then he left.");
        assert_eq!(sentences, vec!["He said \"stop.\"", "Then he left."]);
    }

    #[test]
    fn segment_assigns_document_order() {
        let sentences = segment("One here. Two here. Three here.");
        let indices: Vec<usize> = sentences.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn ensure_ready_is_idempotent() {
        ensure_ready();
        ensure_ready();
        assert!(resources().abbreviations.contains("al"));
    }
}
