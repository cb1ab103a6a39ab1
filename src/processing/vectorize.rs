//! TF-IDF vector space over short texts.
//!
//! Rows are built the conventional way: lower-cased tokens of two or more word characters,
//! English stop words removed, unigrams plus bigrams drawn from the filtered token stream, smoothed
//! inverse document frequency, and L2-normalised rows. Rows are stored sparsely because sentences
//! touch only a handful of the vocabulary.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use super::types::VectorizeError;

/// Default vocabulary cap, keeping the most frequent terms across the corpus.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Whether `word` (already lower-cased) is on the English stop-word list.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS
        .get_or_init(|| ENGLISH_STOP_WORDS.iter().copied().collect())
        .contains(word)
}

/// Lower-cased tokens of two or more word characters (letters, digits, underscore).
pub fn word_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    lower
        .split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Unigram and bigram terms for one text, after stop-word removal.
fn analyze(text: &str) -> Vec<String> {
    let tokens: Vec<String> = word_tokens(text)
        .into_iter()
        .filter(|token| !is_stop_word(token))
        .collect();
    let mut terms = tokens.clone();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

/// Builds TF-IDF rows for a batch of texts.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

impl TfidfVectorizer {
    /// Create a vectorizer keeping at most `max_features` terms (clamped to at least one).
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features: max_features.max(1),
        }
    }

    /// Learn the vocabulary from `texts` and return one normalised row per text.
    pub fn fit_transform(&self, texts: &[&str]) -> Result<TfidfMatrix, VectorizeError> {
        if texts.is_empty() {
            return Err(VectorizeError::EmptyCorpus);
        }

        let analyzed: Vec<Vec<String>> = texts.iter().map(|text| analyze(text)).collect();

        let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let mut seen = HashSet::new();
            for term in terms {
                *corpus_counts.entry(term.as_str()).or_default() += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_default() += 1;
                }
            }
        }
        if corpus_counts.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, usize)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);
        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n = texts.len() as f64;
        let vocabulary: HashMap<&str, usize> = kept
            .iter()
            .enumerate()
            .map(|(column, term)| (*term, column))
            .collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = analyzed
            .iter()
            .map(|terms| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for term in terms {
                    if let Some(&column) = vocabulary.get(term.as_str()) {
                        *counts.entry(column).or_default() += 1.0;
                    }
                }
                let mut row: Vec<(usize, f64)> = counts
                    .into_iter()
                    .map(|(column, tf)| (column, tf * idf[column]))
                    .collect();
                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|(_, w)| *w /= norm);
                }
                row
            })
            .collect();

        tracing::trace!(
            rows = texts.len(),
            vocabulary = kept.len(),
            "Built TF-IDF matrix"
        );
        Ok(TfidfMatrix {
            rows,
            vocabulary_size: kept.len(),
        })
    }
}

/// Sparse, row-normalised TF-IDF weights. Each row is sorted by column.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    rows: Vec<Vec<(usize, f64)>>,
    vocabulary_size: usize,
}

impl TfidfMatrix {
    /// Number of rows (input texts).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of retained terms.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Sum of the weights in row `row`.
    pub fn row_sum(&self, row: usize) -> f64 {
        self.rows[row].iter().map(|(_, w)| w).sum()
    }

    /// Cosine similarity of two rows; zero when either row has no terms.
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        let (left, right) = (&self.rows[a], &self.rows[b]);
        let norm_left = left.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        let norm_right = right.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm_left == 0.0 || norm_right == 0.0 {
            return 0.0;
        }

        let (mut i, mut j, mut dot) = (0, 0, 0.0);
        while i < left.len() && j < right.len() {
            match left[i].0.cmp(&right[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += left[i].1 * right[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot / (norm_left * norm_right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_lowercase_and_at_least_two_chars() {
        assert_eq!(
            word_tokens("A Solar-panel array, 2 x PV_cells!"),
            vec!["solar", "panel", "array", "pv_cells"]
        );
    }

    #[test]
    fn stop_words_only_corpus_has_empty_vocabulary() {
        let error = TfidfVectorizer::default()
            .fit_transform(&["the and of", "it is a"])
            .unwrap_err();
        assert_eq!(error, VectorizeError::EmptyVocabulary);
        assert_eq!(
            TfidfVectorizer::default().fit_transform(&[]).unwrap_err(),
            VectorizeError::EmptyCorpus
        );
    }

    #[test]
    fn rows_are_unit_length_and_self_similar() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["solar panels convert sunlight", "wind turbines spin"])
            .unwrap();
        assert_eq!(matrix.len(), 2);
        assert!((matrix.cosine(0, 0) - 1.0).abs() < 1e-9);
        assert_eq!(matrix.cosine(0, 1), 0.0);
    }

    #[test]
    fn bigrams_skip_stop_words() {
        // "solar" and "panels" become adjacent once "the" is removed.
        let terms = analyze("solar the panels");
        assert!(terms.contains(&"solar panels".to_string()));
    }

    #[test]
    fn vocabulary_is_capped_by_frequency() {
        let matrix = TfidfVectorizer::new(1)
            .fit_transform(&["energy storage", "energy grid", "energy policy"])
            .unwrap();
        assert_eq!(matrix.vocabulary_size(), 1);
        assert!((matrix.cosine(0, 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shared_terms_increase_similarity() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&[
                "battery storage for solar farms",
                "battery chemistry research",
                "solar",
            ])
            .unwrap();
        assert!(matrix.cosine(0, 2) > matrix.cosine(1, 2));
        assert!(matrix.row_sum(0) > 0.0);
    }
}
