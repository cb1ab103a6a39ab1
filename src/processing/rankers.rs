//! Unsupervised sentence rankers for summaries without a query.
//!
//! Two strategies share the [`SentenceRanker`] capability: [`LsaRanker`] rates sentences by their
//! weight in the latent semantic space of the term/sentence matrix, and [`LexRankRanker`] rates
//! them by centrality in a similarity graph. The service tries them in order until one succeeds.

use std::collections::{HashMap, HashSet};

use super::types::{RankerError, Sentence};
use super::vectorize::is_stop_word;

/// Ranks sentences and returns the best `count` of them in document order.
pub trait SentenceRanker: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return up to `count` top-rated sentences, sorted by original index.
    ///
    /// Every sentence is returned when `count` is at least the number of sentences.
    fn rank(&self, sentences: &[Sentence], count: usize) -> Result<Vec<Sentence>, RankerError>;
}

/// Default ranker chain: LSA first, LexRank as the fallback.
pub fn default_rankers() -> Vec<Box<dyn SentenceRanker>> {
    vec![Box::new(LsaRanker::default()), Box::new(LexRankRanker::default())]
}

/// Number of sentences the general path asks for: 40% of the input, clamped to `[20, 100]`.
pub fn general_target_sentences(total_sentences: usize) -> usize {
    let proportional = (total_sentences as f64 * 0.4).round() as usize;
    proportional.clamp(20, 100)
}

/// Lower-cased words containing at least one letter, stop words removed.
fn content_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| word.chars().any(char::is_alphabetic))
        .filter(|word| !is_stop_word(word))
        .map(str::to_string)
        .collect()
}

/// Keep the `count` best-rated sentences (earlier index wins ties) and restore document order.
fn best_sentences(sentences: &[Sentence], ratings: &[f64], count: usize) -> Vec<Sentence> {
    let mut order: Vec<usize> = (0..sentences.len()).collect();
    order.sort_by(|&a, &b| ratings[b].total_cmp(&ratings[a]).then_with(|| a.cmp(&b)));
    order.truncate(count);
    order.sort_unstable();
    order.into_iter().map(|i| sentences[i].clone()).collect()
}

/// Latent semantic analysis ranker.
///
/// Builds a term/sentence matrix with smoothed term frequency, takes the singular triplets of
/// that matrix, and rates sentence `j` as `sqrt(sum_i sigma_i^2 * v_ij^2)` over the retained
/// dimensions.
#[derive(Debug, Clone)]
pub struct LsaRanker {
    reduction_ratio: f64,
    max_iterations: usize,
}

impl Default for LsaRanker {
    fn default() -> Self {
        Self {
            reduction_ratio: 1.0,
            max_iterations: 1000,
        }
    }
}

const LSA: &str = "lsa";
const LSA_MIN_DIMENSIONS: usize = 3;
const LSA_SMOOTHING: f64 = 0.4;
const LSA_TOLERANCE: f64 = 1e-7;

impl LsaRanker {
    /// Retain `reduction_ratio` of the singular dimensions (never fewer than three).
    pub fn with_reduction_ratio(reduction_ratio: f64) -> Self {
        Self {
            reduction_ratio: reduction_ratio.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Column-major term/sentence matrix: `columns[sentence][term]`.
    fn term_matrix(&self, sentences: &[Sentence]) -> Result<Vec<Vec<f64>>, RankerError> {
        let words: Vec<Vec<String>> = sentences.iter().map(|s| content_words(&s.text)).collect();
        let mut vocabulary: HashMap<&str, usize> = HashMap::new();
        for word in words.iter().flatten() {
            let next = vocabulary.len();
            vocabulary.entry(word.as_str()).or_insert(next);
        }
        if vocabulary.is_empty() {
            return Err(RankerError::EmptyVocabulary { ranker: LSA });
        }

        Ok(words
            .iter()
            .map(|sentence_words| {
                let mut column = vec![0.0; vocabulary.len()];
                for word in sentence_words {
                    column[vocabulary[word.as_str()]] += 1.0;
                }
                let max = column.iter().copied().fold(0.0_f64, f64::max);
                if max > 0.0 {
                    for value in &mut column {
                        *value = LSA_SMOOTHING + (1.0 - LSA_SMOOTHING) * *value / max;
                    }
                }
                column
            })
            .collect())
    }

    /// Top `dimensions` eigenpairs of the Gram matrix `A^T A` by orthogonal iteration.
    ///
    /// Eigenvalues are the squared singular values of `A`; eigenvectors are the rows of `V^T`.
    fn top_eigenpairs(
        &self,
        gram: &[Vec<f64>],
        dimensions: usize,
    ) -> Result<(Vec<f64>, Vec<Vec<f64>>), RankerError> {
        let n = gram.len();
        let mut basis: Vec<Vec<f64>> = (0..dimensions)
            .map(|k| {
                (0..n)
                    .map(|i| if i == k { 1.0 } else { 1.0 / (1.0 + (i + k) as f64) })
                    .collect()
            })
            .collect();
        orthonormalize(&mut basis);

        let mut eigenvalues = vec![0.0; dimensions];
        for _ in 0..self.max_iterations {
            let mut next: Vec<Vec<f64>> =
                basis.iter().map(|vector| multiply(gram, vector)).collect();
            let estimates: Vec<f64> = basis
                .iter()
                .zip(&next)
                .map(|(vector, image)| dot(vector, image))
                .collect();
            orthonormalize(&mut next);

            let settled = estimates
                .iter()
                .zip(&eigenvalues)
                .all(|(now, before)| (now - before).abs() <= LSA_TOLERANCE * now.abs().max(1.0));
            eigenvalues = estimates;
            basis = next;
            if settled {
                return Ok((eigenvalues, basis));
            }
        }
        Err(RankerError::DidNotConverge {
            ranker: LSA,
            iterations: self.max_iterations,
        })
    }
}

impl SentenceRanker for LsaRanker {
    fn name(&self) -> &'static str {
        LSA
    }

    fn rank(&self, sentences: &[Sentence], count: usize) -> Result<Vec<Sentence>, RankerError> {
        if sentences.is_empty() {
            return Err(RankerError::NoSentences { ranker: LSA });
        }
        let columns = self.term_matrix(sentences)?;
        let terms = columns[0].len();
        let singular_values = terms.min(sentences.len());
        let dimensions = LSA_MIN_DIMENSIONS
            .max((singular_values as f64 * self.reduction_ratio) as usize);

        // Keeping every dimension collapses the rating to the column norm of A.
        let ratings: Vec<f64> = if dimensions >= singular_values {
            columns.iter().map(|column| dot(column, column).sqrt()).collect()
        } else {
            let gram: Vec<Vec<f64>> = columns
                .iter()
                .map(|a| columns.iter().map(|b| dot(a, b)).collect())
                .collect();
            let (eigenvalues, vectors) = self.top_eigenpairs(&gram, dimensions)?;
            (0..sentences.len())
                .map(|j| {
                    eigenvalues
                        .iter()
                        .zip(&vectors)
                        .map(|(lambda, vector)| lambda.max(0.0) * vector[j] * vector[j])
                        .sum::<f64>()
                        .sqrt()
                })
                .collect()
        };

        tracing::trace!(terms, dimensions, "Rated sentences with LSA");
        Ok(best_sentences(sentences, &ratings, count))
    }
}

/// Graph-centrality ranker with idf-modified cosine edges.
#[derive(Debug, Clone)]
pub struct LexRankRanker {
    threshold: f64,
    epsilon: f64,
    max_iterations: usize,
}

impl Default for LexRankRanker {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            epsilon: 0.1,
            max_iterations: 1000,
        }
    }
}

const LEXRANK: &str = "lexrank";

impl LexRankRanker {
    fn modified_cosine(
        left: &HashMap<String, f64>,
        right: &HashMap<String, f64>,
        idf: &HashMap<String, f64>,
    ) -> f64 {
        let numerator: f64 = left
            .iter()
            .filter_map(|(term, tf)| right.get(term).map(|other| tf * other * idf[term].powi(2)))
            .sum();
        let magnitude = |tfs: &HashMap<String, f64>| {
            tfs.iter()
                .map(|(term, tf)| (tf * idf[term]).powi(2))
                .sum::<f64>()
                .sqrt()
        };
        let (left_norm, right_norm) = (magnitude(left), magnitude(right));
        if left_norm > 0.0 && right_norm > 0.0 {
            numerator / (left_norm * right_norm)
        } else {
            0.0
        }
    }

    fn power_method(&self, matrix: &[Vec<f64>]) -> Result<Vec<f64>, RankerError> {
        let n = matrix.len();
        let mut p = vec![1.0 / n as f64; n];
        for _ in 0..self.max_iterations {
            let next: Vec<f64> = (0..n)
                .map(|col| (0..n).map(|row| matrix[row][col] * p[row]).sum())
                .collect();
            let delta = next
                .iter()
                .zip(&p)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            p = next;
            if delta <= self.epsilon {
                return Ok(p);
            }
        }
        Err(RankerError::DidNotConverge {
            ranker: LEXRANK,
            iterations: self.max_iterations,
        })
    }
}

impl SentenceRanker for LexRankRanker {
    fn name(&self) -> &'static str {
        LEXRANK
    }

    fn rank(&self, sentences: &[Sentence], count: usize) -> Result<Vec<Sentence>, RankerError> {
        if sentences.is_empty() {
            return Err(RankerError::NoSentences { ranker: LEXRANK });
        }
        let words: Vec<Vec<String>> = sentences.iter().map(|s| content_words(&s.text)).collect();
        if words.iter().all(Vec::is_empty) {
            return Err(RankerError::EmptyVocabulary { ranker: LEXRANK });
        }

        let tf: Vec<HashMap<String, f64>> = words
            .iter()
            .map(|sentence_words| {
                let mut counts: HashMap<String, f64> = HashMap::new();
                for word in sentence_words {
                    *counts.entry(word.clone()).or_default() += 1.0;
                }
                let max = counts.values().copied().fold(0.0_f64, f64::max);
                counts.values_mut().for_each(|value| *value /= max.max(1.0));
                counts
            })
            .collect();

        let n = sentences.len() as f64;
        let mut document_frequency: HashMap<String, f64> = HashMap::new();
        for sentence_words in &words {
            for word in sentence_words.iter().collect::<HashSet<_>>() {
                *document_frequency.entry(word.clone()).or_default() += 1.0;
            }
        }
        let idf: HashMap<String, f64> = document_frequency
            .into_iter()
            .map(|(term, df)| (term, (n / (1.0 + df)).ln()))
            .collect();

        let mut matrix: Vec<Vec<f64>> = tf
            .iter()
            .map(|row| {
                tf.iter()
                    .map(|col| {
                        let similarity = Self::modified_cosine(row, col, &idf);
                        if similarity > self.threshold { 1.0 } else { 0.0 }
                    })
                    .collect()
            })
            .collect();
        for row in &mut matrix {
            let degree = row.iter().sum::<f64>().max(1.0);
            row.iter_mut().for_each(|value| *value /= degree);
        }

        let ratings = self.power_method(&matrix)?;
        Ok(best_sentences(sentences, &ratings, count))
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn multiply(matrix: &[Vec<f64>], vector: &[f64]) -> Vec<f64> {
    matrix.iter().map(|row| dot(row, vector)).collect()
}

/// Modified Gram-Schmidt; vectors that collapse to zero are left as zero.
fn orthonormalize(vectors: &mut [Vec<f64>]) {
    for i in 0..vectors.len() {
        for j in 0..i {
            let projection = dot(&vectors[i], &vectors[j]);
            let (done, rest) = vectors.split_at_mut(i);
            for (value, basis) in rest[0].iter_mut().zip(&done[j]) {
                *value -= projection * basis;
            }
        }
        let norm = dot(&vectors[i], &vectors[i]).sqrt();
        if norm > 1e-12 {
            vectors[i].iter_mut().for_each(|value| *value /= norm);
        } else {
            vectors[i].iter_mut().for_each(|value| *value = 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Vec<Sentence> {
        [
            "Solar panels convert sunlight into electricity for homes.",
            "Electricity from solar panels powers many homes today.",
            "The cat slept quietly on the warm windowsill.",
            "Battery storage keeps solar electricity available at night.",
            "Grid operators balance electricity demand with solar supply.",
            "A recipe for bread needs flour, water, and yeast.",
        ]
        .iter()
        .enumerate()
        .map(|(i, text)| Sentence::new(*text, i))
        .collect()
    }

    #[test]
    fn general_target_is_clamped() {
        assert_eq!(general_target_sentences(10), 20);
        assert_eq!(general_target_sentences(50), 20);
        assert_eq!(general_target_sentences(100), 40);
        assert_eq!(general_target_sentences(1000), 100);
    }

    #[test]
    fn rankers_return_everything_when_count_exceeds_input() {
        let sentences = document();
        for ranker in default_rankers() {
            let ranked = ranker.rank(&sentences, 50).unwrap();
            assert_eq!(ranked, sentences, "{}", ranker.name());
        }
    }

    #[test]
    fn rankers_return_requested_count_in_document_order() {
        let sentences = document();
        for ranker in default_rankers() {
            let ranked = ranker.rank(&sentences, 3).unwrap();
            assert_eq!(ranked.len(), 3, "{}", ranker.name());
            assert!(ranked.windows(2).all(|pair| pair[0].index < pair[1].index));
        }
    }

    #[test]
    fn lexrank_prefers_central_sentences() {
        let ranked = LexRankRanker::default().rank(&document(), 2).unwrap();
        assert!(ranked.iter().all(|s| s.text.contains("olar") || s.text.contains("lectricity")));
    }

    #[test]
    fn reduced_lsa_selects_requested_count() {
        let sentences = document();
        let reduced = LsaRanker::with_reduction_ratio(0.0).rank(&sentences, 2).unwrap();
        assert_eq!(reduced.len(), 2);
        assert!(reduced[0].index < reduced[1].index);
    }

    #[test]
    fn empty_input_and_vocabulary_are_errors() {
        for ranker in default_rankers() {
            assert!(matches!(
                ranker.rank(&[], 5),
                Err(RankerError::NoSentences { .. })
            ));
            let symbols = vec![Sentence::new("123 456 !!!", 0), Sentence::new("the of and", 1)];
            assert!(matches!(
                ranker.rank(&symbols, 5),
                Err(RankerError::EmptyVocabulary { .. })
            ));
        }
    }
}
