use std::sync::atomic::{AtomicU64, Ordering};

/// Which recovery tier, if any, produced a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Query-focused vector scoring failed; keyword overlap produced the text.
    KeywordExtraction,
    /// Both unsupervised rankers failed; the text was truncated at a sentence boundary.
    Truncation,
}

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct SummaryMetrics {
    documents_processed: AtomicU64,
    documents_skipped: AtomicU64,
    summaries_generated: AtomicU64,
    summaries_failed: AtomicU64,
    keyword_fallbacks: AtomicU64,
    truncation_fallbacks: AtomicU64,
    last_summary_tokens: AtomicU64,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how many input documents were used and how many were dropped as unreadable.
    pub fn record_documents(&self, processed: u64, skipped: u64) {
        self.documents_processed
            .fetch_add(processed, Ordering::Relaxed);
        self.documents_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    /// Record a produced summary and its estimated token footprint.
    pub fn record_summary(&self, estimated_tokens: u64) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
        self.last_summary_tokens
            .store(estimated_tokens, Ordering::Relaxed);
    }

    /// Record a request that ended in a `{success: false}` result.
    pub fn record_failure(&self) {
        self.summaries_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record that a fallback tier was used to produce a summary.
    pub fn record_fallback(&self, kind: FallbackKind) {
        let counter = match kind {
            FallbackKind::KeywordExtraction => &self.keyword_fallbacks,
            FallbackKind::Truncation => &self.truncation_fallbacks,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let summaries_generated = self.summaries_generated.load(Ordering::Relaxed);
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            documents_skipped: self.documents_skipped.load(Ordering::Relaxed),
            summaries_generated,
            summaries_failed: self.summaries_failed.load(Ordering::Relaxed),
            keyword_fallbacks: self.keyword_fallbacks.load(Ordering::Relaxed),
            truncation_fallbacks: self.truncation_fallbacks.load(Ordering::Relaxed),
            last_summary_tokens: (summaries_generated > 0)
                .then(|| self.last_summary_tokens.load(Ordering::Relaxed)),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents that contributed text to a summary since startup.
    pub documents_processed: u64,
    /// Documents skipped because extraction failed or produced no text.
    pub documents_skipped: u64,
    /// Successful summaries produced since startup.
    pub summaries_generated: u64,
    /// Requests answered with `{success: false}`.
    pub summaries_failed: u64,
    /// Summaries produced by the keyword-overlap fallback.
    pub keyword_fallbacks: u64,
    /// Summaries produced by intelligent truncation.
    pub truncation_fallbacks: u64,
    /// Estimated token count of the most recent summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_summary_tokens: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_summaries() {
        let metrics = SummaryMetrics::new();
        metrics.record_documents(2, 1);
        metrics.record_documents(3, 0);
        metrics.record_summary(120);
        metrics.record_summary(80);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_processed, 5);
        assert_eq!(snapshot.documents_skipped, 1);
        assert_eq!(snapshot.summaries_generated, 2);
        assert_eq!(snapshot.last_summary_tokens, Some(80));
    }

    #[test]
    fn fallbacks_are_counted_per_tier() {
        let metrics = SummaryMetrics::new();
        metrics.record_fallback(FallbackKind::KeywordExtraction);
        metrics.record_fallback(FallbackKind::Truncation);
        metrics.record_fallback(FallbackKind::Truncation);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.keyword_fallbacks, 1);
        assert_eq!(snapshot.truncation_fallbacks, 2);
        assert_eq!(snapshot.summaries_failed, 1);
    }

    #[test]
    fn empty_snapshot_has_no_token_estimate() {
        let metrics = SummaryMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.summaries_generated, 0);
        assert!(snapshot.last_summary_tokens.is_none());
    }
}
