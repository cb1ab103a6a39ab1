//! Token estimation for reporting how much of a model's context a summary uses.
//!
//! Counting prefers the `cl100k_base` encoding from `tiktoken-rs`. When the encoding cannot be
//! loaded the counter falls back to whitespace splitting and logs the downgrade once.

use std::sync::{Arc, OnceLock};

use anyhow::Error as TokenizerError;
use tiktoken_rs::{CoreBPE, cl100k_base};

type TokenCounter = Arc<dyn Fn(&str) -> usize + Send + Sync>;

static COUNTER: OnceLock<TokenCounter> = OnceLock::new();

/// Estimated token count of `text` under the shared counter.
pub fn estimate_tokens(text: &str) -> usize {
    let counter = COUNTER.get_or_init(|| match build_tiktoken_counter() {
        Ok(counter) => counter,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Tokenizer unavailable; falling back to whitespace counter"
            );
            default_token_counter()
        }
    });
    counter(text)
}

fn build_tiktoken_counter() -> Result<TokenCounter, TokenizerError> {
    let encoding: Arc<CoreBPE> = Arc::new(cl100k_base()?);
    Ok(Arc::new(move |segment: &str| {
        encoding.encode_ordinary(segment).len()
    }))
}

fn default_token_counter() -> TokenCounter {
    Arc::new(|segment: &str| segment.split_whitespace().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_counter_counts_words() {
        let counter = default_token_counter();
        assert_eq!(counter("  solar   power\tplant\n"), 3);
        assert_eq!(counter(""), 0);
    }

    #[test]
    fn estimate_is_zero_for_empty_text_and_grows_with_length() {
        assert_eq!(estimate_tokens(""), 0);
        let short = estimate_tokens("Solar power");
        let long = estimate_tokens("Solar power plants convert sunlight into electricity.");
        assert!(short > 0);
        assert!(long > short);
    }
}
