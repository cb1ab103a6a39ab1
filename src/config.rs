use crate::processing::SummarizerSettings;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Default upper bound on the size of a single uploaded file (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Rusty Digest server and CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Budgets, weights, and thresholds used by the summarization core.
    pub summarizer: SummarizerSettings,
    /// Largest file (in bytes) the text extractor accepts.
    pub max_file_size: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            summarizer: SummarizerSettings::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            server_port: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    ///
    /// Every variable is optional; unset or blank values keep the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = SummarizerSettings::default();
        let summarizer = SummarizerSettings {
            max_tokens: parse_env_or("DIGEST_MAX_TOKENS", defaults.max_tokens)?,
            token_char_ratio: parse_env_or("DIGEST_TOKEN_CHAR_RATIO", defaults.token_char_ratio)?,
            query_weight: parse_env_or("DIGEST_QUERY_WEIGHT", defaults.query_weight)?,
            redundancy_threshold: parse_env_or(
                "DIGEST_REDUNDANCY_THRESHOLD",
                defaults.redundancy_threshold,
            )?,
            redundancy_window: parse_env_or(
                "DIGEST_REDUNDANCY_WINDOW",
                defaults.redundancy_window,
            )?,
            max_selected_sentences: parse_env_or(
                "DIGEST_MAX_SELECTED_SENTENCES",
                defaults.max_selected_sentences,
            )?,
            budget_fill_ratio: parse_env_or(
                "DIGEST_BUDGET_FILL_RATIO",
                defaults.budget_fill_ratio,
            )?,
        };

        Ok(Self {
            summarizer,
            max_file_size: parse_env_or("DIGEST_MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE)?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        max_tokens = config.summarizer.max_tokens,
        token_char_ratio = config.summarizer.token_char_ratio,
        query_weight = config.summarizer.query_weight,
        redundancy_threshold = config.summarizer.redundancy_threshold,
        budget_fill_ratio = config.summarizer.budget_fill_ratio,
        max_file_size = config.max_file_size,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_or_falls_back_to_default_when_unset() {
        let value: usize = parse_env_or("RUSTY_DIGEST_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_env_or_reports_invalid_values() {
        // SAFETY: the variable name is unique to this test.
        unsafe { env::set_var("RUSTY_DIGEST_TEST_BAD_NUMBER", "not-a-number") };
        let error = parse_env_or::<usize>("RUSTY_DIGEST_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(
            matches!(error, ConfigError::InvalidValue(key) if key == "RUSTY_DIGEST_TEST_BAD_NUMBER")
        );
    }

    #[test]
    fn from_env_reads_budget_fill_ratio() {
        // SAFETY: no other test reads or writes this variable.
        unsafe { env::set_var("DIGEST_BUDGET_FILL_RATIO", "0.5") };
        let config = Config::from_env().unwrap();
        unsafe { env::remove_var("DIGEST_BUDGET_FILL_RATIO") };
        assert_eq!(config.summarizer.budget_fill_ratio, 0.5);
    }

    #[test]
    fn default_config_matches_documented_budget() {
        let config = Config::default();
        assert_eq!(config.summarizer.max_tokens, 8000);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert!(config.server_port.is_none());
    }
}
