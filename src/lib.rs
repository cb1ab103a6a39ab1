#![deny(missing_docs)]

//! Core library for Rusty Digest: query-focused extractive summarization that keeps uploaded
//! documents inside a language model's context budget.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// File-to-text extraction.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization metrics helpers.
pub mod metrics;
/// Sentence segmentation, scoring, selection, and fallback tiers.
pub mod processing;
