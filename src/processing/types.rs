//! Core data types and error definitions for the summarization pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::selection::SelectionBudget;
use crate::metrics::FallbackKind;

/// Label reported in every successful [`SummaryReport`].
pub const APPROACH_EXTRACTIVE: &str = "extractive_summarization";

/// Errors produced while building the TF-IDF vector space.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VectorizeError {
    /// No rows were supplied to the vectorizer.
    #[error("cannot vectorize an empty corpus")]
    EmptyCorpus,
    /// Every token was dropped (stop words, single characters, punctuation).
    #[error("empty vocabulary; the documents may only contain stop words")]
    EmptyVocabulary,
}

/// Errors produced by the unsupervised sentence rankers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankerError {
    /// The document contained no sentences to rank.
    #[error("{ranker}: document has no sentences")]
    NoSentences {
        /// Ranker that rejected the document.
        ranker: &'static str,
    },
    /// No rankable word survived tokenization.
    #[error("{ranker}: document has no rankable words")]
    EmptyVocabulary {
        /// Ranker that rejected the document.
        ranker: &'static str,
    },
    /// Iterative scoring failed to settle within the iteration cap.
    #[error("{ranker}: scores did not converge after {iterations} iterations")]
    DidNotConverge {
        /// Ranker that gave up.
        ranker: &'static str,
        /// Iterations performed before giving up.
        iterations: usize,
    },
}

/// Errors emitted by the summarization pipeline.
///
/// Only [`SummarizeError::NoReadableContent`] and [`SummarizeError::InvalidSettings`] reach the
/// caller; the other variants are recovered by the fallback chain and logged.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// No document yielded usable text.
    #[error("No readable content found")]
    NoReadableContent,
    /// Budget or weighting parameters are out of range.
    #[error("Invalid summarizer settings: {0}")]
    InvalidSettings(String),
    /// The query-focused scoring stage could not build its vector space.
    #[error("Vectorization failed: {0}")]
    Vectorization(#[from] VectorizeError),
    /// Every unsupervised ranker failed.
    #[error("Sentence ranking failed: {0}")]
    Ranking(#[from] RankerError),
}

/// Metadata describing a source document, as reported back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// File name without directories.
    pub filename: String,
    /// Lower-cased extension including the leading dot (empty when absent).
    #[serde(default)]
    pub extension: String,
    /// Size of the source file in bytes.
    #[serde(default)]
    pub size: u64,
}

impl DocumentInfo {
    /// Build metadata from a file name, deriving the extension.
    pub fn from_filename(filename: impl Into<String>, size: u64) -> Self {
        let filename = filename.into();
        let extension = std::path::Path::new(&filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();
        Self {
            filename,
            extension,
            size,
        }
    }
}

/// A source document after text extraction. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Where the text came from.
    pub info: DocumentInfo,
    /// Extracted plain text.
    pub raw_text: String,
}

impl Document {
    /// Build a document from raw text, deriving metadata from the file name.
    pub fn new(filename: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let size = raw_text.len() as u64;
        Self {
            info: DocumentInfo::from_filename(filename, size),
            raw_text,
        }
    }
}

/// A sentence and its position in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Sentence text, trimmed.
    pub text: String,
    /// Position in the combined document; the sort key that restores reading order.
    pub index: usize,
}

impl Sentence {
    /// Pair sentence text with its original position.
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }

    /// Length in characters, the unit every budget is expressed in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A sentence with the score used to order selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    /// The scored sentence.
    pub sentence: Sentence,
    /// Blended relevance/importance score, or a ranker's rating.
    pub score: f64,
}

/// Which path produced a summary's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStrategy {
    /// Too few scorable sentences; the combined text was returned untouched.
    Passthrough,
    /// TF-IDF relevance scoring followed by budgeted selection.
    QueryFocused,
    /// Keyword overlap, after query-focused scoring failed.
    KeywordFallback,
    /// The named unsupervised ranker.
    Ranked(&'static str),
    /// Truncation at a sentence boundary, after every ranker failed.
    Truncated,
}

impl SummaryStrategy {
    /// The fallback tier this strategy represents, if any.
    pub fn fallback(self) -> Option<FallbackKind> {
        match self {
            Self::KeywordFallback => Some(FallbackKind::KeywordExtraction),
            Self::Truncated => Some(FallbackKind::Truncation),
            _ => None,
        }
    }
}

/// Summary text together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// The bounded text block.
    pub content: String,
    /// Path that produced `content`.
    pub strategy: SummaryStrategy,
}

/// Input to [`crate::processing::DigestService::process`].
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    /// Extracted documents, in the order they should be combined.
    pub documents: Vec<Document>,
    /// Task description supplied by the caller; doubles as the query when none is given.
    pub task: String,
    /// Free-form task category echoed back to downstream writers.
    pub task_type: String,
    /// Optional explicit query driving the focused path.
    pub query: Option<String>,
}

impl SummaryRequest {
    /// The query that drives selection, if any.
    ///
    /// An explicit non-blank query wins; otherwise a non-blank task is used as the query.
    pub fn effective_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .or_else(|| Some(self.task.trim()).filter(|task| !task.is_empty()))
    }
}

/// Successful summarization artifact handed to downstream writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Always `true`.
    pub success: bool,
    /// Always [`APPROACH_EXTRACTIVE`].
    pub approach: String,
    /// The bounded text block.
    pub processed_content: String,
    /// Metadata for every document that contributed text.
    pub file_info: Vec<DocumentInfo>,
    /// Task echoed from the request.
    pub task: String,
    /// Task type echoed from the request.
    pub task_type: String,
}

/// Failure artifact; never raised as a panic or transport error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryFailure {
    /// Always `false`.
    pub success: bool,
    /// Human-readable reason.
    pub error: String,
}

/// Result of a summarization call, serialized without an enum tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryResult {
    /// `{success: true, approach, processed_content, file_info, task, task_type}`.
    Success(SummaryReport),
    /// `{success: false, error}`.
    Failure(SummaryFailure),
}

impl SummaryResult {
    /// Build a success result.
    pub fn success(
        processed_content: String,
        file_info: Vec<DocumentInfo>,
        task: String,
        task_type: String,
    ) -> Self {
        Self::Success(SummaryReport {
            success: true,
            approach: APPROACH_EXTRACTIVE.to_string(),
            processed_content,
            file_info,
            task,
            task_type,
        })
    }

    /// Build a failure result from any displayable error.
    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self::Failure(SummaryFailure {
            success: false,
            error: error.to_string(),
        })
    }

    /// Whether the call produced a summary.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The summary text, when the call succeeded.
    pub fn processed_content(&self) -> Option<&str> {
        match self {
            Self::Success(report) => Some(&report.processed_content),
            Self::Failure(_) => None,
        }
    }
}

/// Tunable parameters for the summarization core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerSettings {
    /// Token budget for the produced text.
    pub max_tokens: usize,
    /// Tokens per character used to convert the token budget into characters.
    pub token_char_ratio: f64,
    /// Weight of query similarity in the blended score; importance receives the rest.
    pub query_weight: f64,
    /// Jaccard overlap above which a candidate is rejected as redundant.
    pub redundancy_threshold: f64,
    /// How many of the most recently accepted sentences a candidate is compared against.
    pub redundancy_window: usize,
    /// Hard ceiling on sentences accepted by the selection engine.
    pub max_selected_sentences: usize,
    /// Fraction of the character budget after which selection stops.
    pub budget_fill_ratio: f64,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            max_tokens: 8000,
            token_char_ratio: 0.3,
            query_weight: 0.7,
            redundancy_threshold: 0.7,
            redundancy_window: 5,
            max_selected_sentences: 40,
            budget_fill_ratio: 0.85,
        }
    }
}

impl SummarizerSettings {
    /// Character budget derived from the token budget.
    pub fn budget(&self) -> SelectionBudget {
        SelectionBudget::new(self.max_tokens, self.token_char_ratio)
    }

    /// Reject parameter combinations the pipeline cannot honour.
    pub fn validate(&self) -> Result<(), SummarizeError> {
        if self.max_tokens == 0 {
            return Err(SummarizeError::InvalidSettings(
                "max_tokens must be greater than zero".into(),
            ));
        }
        if !(self.token_char_ratio.is_finite() && self.token_char_ratio > 0.0) {
            return Err(SummarizeError::InvalidSettings(
                "token_char_ratio must be a positive number".into(),
            ));
        }
        for (name, value) in [
            ("query_weight", self.query_weight),
            ("redundancy_threshold", self.redundancy_threshold),
            ("budget_fill_ratio", self.budget_fill_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SummarizeError::InvalidSettings(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
