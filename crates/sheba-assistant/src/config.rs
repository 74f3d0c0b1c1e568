use std::path::Path;
use std::time::Duration;

use sheba_common::assistant::DEFAULT_TOP_N;
use sheba_common::config::PipelineConfig;
use sheba_common::conversation::DEFAULT_CONVERSATION_TTL;

use crate::error::AppError;

const DEFAULT_THINKING_DELAY_MS: u64 = 2_000;
pub const MAX_TOP_N: usize = 10;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pause before the assistant replies to a chat message.
    pub thinking_delay: Duration,
    /// Default number of providers per recommendation.
    pub top_n: usize,
    /// Idle time after which a conversation is forgotten.
    pub conversation_ttl: Duration,
    /// Optional JSON file overriding classifier and pricing constants.
    pub pipeline_config_path: Option<String>,
}

impl Config {
    /// Optional:
    /// - `SHEBA_THINKING_DELAY_MS` (default: 2000)
    /// - `SHEBA_TOP_N` (default: 3, max: 10)
    /// - `SHEBA_CONVO_TTL_SECS` (default: 86400)
    /// - `SHEBA_PIPELINE_CONFIG`: path to a pipeline config JSON file
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let thinking_delay_ms = match var("SHEBA_THINKING_DELAY_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!(
                    "SHEBA_THINKING_DELAY_MS must be a whole number of milliseconds, got '{raw}'"
                ))
            })?,
            None => DEFAULT_THINKING_DELAY_MS,
        };

        let top_n = match var("SHEBA_TOP_N") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_TOP_N).contains(n))
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "SHEBA_TOP_N must be between 1 and {MAX_TOP_N}, got '{raw}'"
                    ))
                })?,
            None => DEFAULT_TOP_N,
        };

        let conversation_ttl = match var("SHEBA_CONVO_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "SHEBA_CONVO_TTL_SECS must be a positive number of seconds, got '{raw}'"
                    ))
                })?,
            None => DEFAULT_CONVERSATION_TTL,
        };

        let pipeline_config_path = var("SHEBA_PIPELINE_CONFIG").filter(|p| !p.trim().is_empty());

        Ok(Self {
            thinking_delay: Duration::from_millis(thinking_delay_ms),
            top_n,
            conversation_ttl,
            pipeline_config_path,
        })
    }

    /// Load the pipeline constants, falling back to the built-in defaults.
    pub fn pipeline(&self) -> Result<PipelineConfig, AppError> {
        match &self.pipeline_config_path {
            Some(path) => Ok(PipelineConfig::from_file(Path::new(path))?),
            None => Ok(PipelineConfig::default()),
        }
    }
}
