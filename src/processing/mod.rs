//! Summarization core: segmentation, relevance scoring, redundancy control, and fallbacks.

pub mod fallback;
pub mod rankers;
pub mod redundancy;
pub mod scoring;
pub mod segment;
pub mod selection;
mod service;
pub mod tokens;
pub mod types;
pub mod vectorize;

pub use rankers::{LexRankRanker, LsaRanker, SentenceRanker};
pub use selection::SelectionBudget;
pub use service::{DEFAULT_TASK_TYPE, DigestService, SummarizationApi, combine_documents};
pub use types::{
    Document, DocumentInfo, RankerError, ScoredSentence, Sentence, SummarizeError,
    SummarizerSettings, Summary, SummaryFailure, SummaryReport, SummaryRequest, SummaryResult,
    SummaryStrategy, VectorizeError,
};
