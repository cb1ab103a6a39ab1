//! Summarization service coordinating segmentation, scoring, ranking, and recovery tiers.

use crate::{
    config::get_config,
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::{
        fallback::{intelligent_truncation, keyword_extraction},
        rankers::{SentenceRanker, default_rankers, general_target_sentences},
        scoring::{MIN_SCORABLE_SENTENCES, filter_sentences, score_against_query},
        segment::{self, segment},
        selection::{format_focused, select},
        tokens::estimate_tokens,
        types::{
            Document, SummarizeError, SummarizerSettings, Summary, SummaryRequest, SummaryResult,
            SummaryStrategy,
        },
    },
};
use async_trait::async_trait;
use std::sync::Arc;

/// Task type reported when the caller leaves it blank.
pub const DEFAULT_TASK_TYPE: &str = "general";

/// Turns extracted documents into one budgeted, information-dense text block.
///
/// Every call builds its own vector space and sentence lists; the only state shared between
/// calls is the metrics registry. The service is cheap to clone, so the HTTP surface hands a
/// copy to a blocking worker for each request.
#[derive(Clone)]
pub struct DigestService {
    settings: SummarizerSettings,
    rankers: Arc<[Box<dyn SentenceRanker>]>,
    metrics: Arc<SummaryMetrics>,
}

/// Abstraction over the summarizer used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait SummarizationApi: Send + Sync {
    /// Summarize the request's documents; failures are reported inside the result.
    async fn summarize(&self, request: SummaryRequest) -> SummaryResult;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl DigestService {
    /// Build a service with the default ranker chain (LSA, then LexRank).
    pub fn new(settings: SummarizerSettings) -> Self {
        Self::with_rankers(settings, default_rankers())
    }

    /// Build a service that tries `rankers` in order on the general path.
    pub fn with_rankers(
        settings: SummarizerSettings,
        rankers: Vec<Box<dyn SentenceRanker>>,
    ) -> Self {
        segment::ensure_ready();
        Self {
            settings,
            rankers: rankers.into(),
            metrics: Arc::new(SummaryMetrics::new()),
        }
    }

    /// Build a service from the global configuration.
    pub fn from_config() -> Self {
        let settings = get_config().summarizer.clone();
        tracing::info!(
            max_tokens = settings.max_tokens,
            target_chars = settings.budget().target_chars(),
            "Initializing summarization service"
        );
        Self::new(settings)
    }

    /// Settings this service was built with.
    pub fn settings(&self) -> &SummarizerSettings {
        &self.settings
    }

    /// Shared metrics registry.
    pub fn metrics(&self) -> Arc<SummaryMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Summarize a batch of documents.
    ///
    /// Never panics on bad input: unrecoverable problems come back as `{success: false}`.
    pub fn process(&self, request: SummaryRequest) -> SummaryResult {
        match self.try_process(request) {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(error = %error, "Summarization request failed");
                self.metrics.record_failure();
                SummaryResult::failure(error)
            }
        }
    }

    fn try_process(&self, request: SummaryRequest) -> Result<SummaryResult, SummarizeError> {
        self.settings.validate()?;
        let query = request.effective_query().map(str::to_string);
        let SummaryRequest {
            documents,
            task,
            task_type,
            ..
        } = request;

        let total = documents.len();
        let readable: Vec<Document> = documents
            .into_iter()
            .filter(|document| {
                let keep = !document.raw_text.trim().is_empty();
                if !keep {
                    tracing::warn!(
                        file = %document.info.filename,
                        "Skipping document without text"
                    );
                }
                keep
            })
            .collect();
        self.metrics
            .record_documents(readable.len() as u64, (total - readable.len()) as u64);
        if readable.is_empty() {
            return Err(SummarizeError::NoReadableContent);
        }

        let combined = combine_documents(&readable);
        let summary = self.summarize_text(&combined, query.as_deref());

        let tokens = estimate_tokens(&summary.content);
        self.metrics.record_summary(tokens as u64);
        if let Some(kind) = summary.strategy.fallback() {
            self.metrics.record_fallback(kind);
        }
        tracing::info!(
            documents = readable.len(),
            strategy = ?summary.strategy,
            chars = summary.content.chars().count(),
            tokens,
            "Generated summary"
        );

        let task_type = if task_type.trim().is_empty() {
            DEFAULT_TASK_TYPE.to_string()
        } else {
            task_type
        };
        Ok(SummaryResult::success(
            summary.content,
            readable.into_iter().map(|document| document.info).collect(),
            task,
            task_type,
        ))
    }

    /// Summarize already-combined text, query-focused when `query` is non-blank.
    pub fn summarize_text(&self, text: &str, query: Option<&str>) -> Summary {
        match query.map(str::trim).filter(|query| !query.is_empty()) {
            Some(query) => self.summarize_focused(text, query),
            None => self.summarize_general(text),
        }
    }

    fn summarize_focused(&self, text: &str, query: &str) -> Summary {
        let target_chars = self.settings.budget().target_chars();
        let sentences = segment(text);
        let clean = filter_sentences(&sentences);
        tracing::debug!(
            sentences = sentences.len(),
            valid = clean.len(),
            target_chars,
            query,
            "Query-focused summarization"
        );

        if clean.len() < MIN_SCORABLE_SENTENCES {
            tracing::info!(
                valid = clean.len(),
                "Too few scorable sentences; returning text unchanged"
            );
            return Summary {
                content: text.to_string(),
                strategy: SummaryStrategy::Passthrough,
            };
        }

        match score_against_query(&clean, query, self.settings.query_weight) {
            Ok(scored) => {
                let selected = select(scored, target_chars, &self.settings);
                Summary {
                    content: format_focused(query, &selected),
                    strategy: SummaryStrategy::QueryFocused,
                }
            }
            Err(error) => {
                tracing::warn!(
                    error = %SummarizeError::from(error),
                    "Query-focused scoring failed; falling back to keyword extraction"
                );
                Summary {
                    content: keyword_extraction(text, query, target_chars),
                    strategy: SummaryStrategy::KeywordFallback,
                }
            }
        }
    }

    fn summarize_general(&self, text: &str) -> Summary {
        let target_chars = self.settings.budget().target_chars();
        let sentences = segment(text);
        let count = general_target_sentences(sentences.len());
        tracing::debug!(
            sentences = sentences.len(),
            count,
            "General summarization"
        );

        for ranker in self.rankers.iter() {
            match ranker.rank(&sentences, count) {
                Ok(ranked) => {
                    let joined = ranked
                        .iter()
                        .map(|sentence| sentence.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    tracing::debug!(
                        ranker = ranker.name(),
                        selected = ranked.len(),
                        "Ranked sentences"
                    );
                    return Summary {
                        content: intelligent_truncation(&joined, target_chars),
                        strategy: SummaryStrategy::Ranked(ranker.name()),
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        ranker = ranker.name(),
                        error = %SummarizeError::from(error),
                        "Sentence ranker failed; trying next strategy"
                    );
                }
            }
        }

        tracing::warn!("All sentence rankers failed; truncating text");
        Summary {
            content: intelligent_truncation(text, target_chars),
            strategy: SummaryStrategy::Truncated,
        }
    }
}

/// Join documents into one blob, each under a `=== <filename> ===` header.
pub fn combine_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|document| format!("=== {} ===\n{}", document.info.filename, document.raw_text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl SummarizationApi for DigestService {
    async fn summarize(&self, request: SummaryRequest) -> SummaryResult {
        let service = self.clone();
        match tokio::task::spawn_blocking(move || service.process(request)).await {
            Ok(result) => result,
            Err(error) => {
                tracing::error!(error = %error, "Summarization worker panicked");
                self.metrics.record_failure();
                SummaryResult::failure(format!("Processing failed: {error}"))
            }
        }
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
