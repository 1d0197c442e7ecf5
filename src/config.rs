//! TOML configuration
//!
//! ```toml
//! [sequencer]
//! verify_delay_ms = 500
//! match_probability = 0.75
//!
//! [card]
//! name = "Ada Lovelace"
//! ```
//!
//! Missing sections and keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::types::IdCard;
use crate::{
    ACQUIRE_DELAY_MS, CONFIDENCE_MAX, CONFIDENCE_MIN, EXTRACT_DELAY_MS, FEATURE_SUMMARY,
    MATCH_PROBABILITY, SAVE_DELAY_MS, VERIFY_DELAY_MS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Sequencer timing and simulated-sensor parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub acquire_delay_ms: u64,
    pub extract_delay_ms: u64,
    pub verify_delay_ms: u64,
    pub save_delay_ms: u64,
    pub confidence_min: u8,
    pub confidence_max: u8,
    pub match_probability: f64,
    pub feature_summary: String,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            acquire_delay_ms: ACQUIRE_DELAY_MS,
            extract_delay_ms: EXTRACT_DELAY_MS,
            verify_delay_ms: VERIFY_DELAY_MS,
            save_delay_ms: SAVE_DELAY_MS,
            confidence_min: CONFIDENCE_MIN,
            confidence_max: CONFIDENCE_MAX,
            match_probability: MATCH_PROBABILITY,
            feature_summary: FEATURE_SUMMARY.to_string(),
        }
    }
}

impl SequencerConfig {
    /// Same parameters with every delay set to `ms`
    pub fn with_uniform_delay(mut self, ms: u64) -> Self {
        self.acquire_delay_ms = ms;
        self.extract_delay_ms = ms;
        self.verify_delay_ms = ms;
        self.save_delay_ms = ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confidence_min > self.confidence_max {
            return Err(ConfigError::Invalid(format!(
                "confidence_min {} exceeds confidence_max {}",
                self.confidence_min, self.confidence_max
            )));
        }
        if self.confidence_max > 100 {
            return Err(ConfigError::Invalid(format!(
                "confidence_max {} exceeds 100",
                self.confidence_max
            )));
        }
        if !(0.0..=1.0).contains(&self.match_probability) {
            return Err(ConfigError::Invalid(format!(
                "match_probability {} outside [0, 1]",
                self.match_probability
            )));
        }
        Ok(())
    }
}

/// Whole-application config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sequencer: SequencerConfig,
    pub card: IdCard,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.sequencer.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.sequencer.extract_delay_ms, 3000);
        assert_eq!(config.sequencer.confidence_min, 70);
        assert_eq!(config.sequencer.confidence_max, 99);
    }

    #[test]
    fn test_partial_sequencer_section() {
        let config = AppConfig::from_toml("[sequencer]\nverify_delay_ms = 10\nmatch_probability = 0.5\n").unwrap();
        assert_eq!(config.sequencer.verify_delay_ms, 10);
        assert_eq!(config.sequencer.match_probability, 0.5);
        assert_eq!(config.sequencer.save_delay_ms, SAVE_DELAY_MS);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = AppConfig::from_toml("[sequencer]\nconfidence_min = 90\nconfidence_max = 80\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let err = AppConfig::from_toml("[sequencer]\nmatch_probability = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("match_probability"));
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(matches!(
            AppConfig::from_toml("[sequencer\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load("/nonexistent/facecap.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
