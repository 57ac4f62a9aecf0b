//! Presentation configuration loaded from TOML
//!
//! Holds the variable priority lists used by the canonicalizer and the exact
//! observation counts that identify instrumented estimation samples. The
//! built-in defaults are `presentation-default.toml`, compiled into the
//! binary; a user file replaces them wholesale.
//!
//! # Example TOML
//! ```toml
//! baseline_order = ["avg_ui_linear", "age", "(intercept)"]
//! instrument_order = ["wealth_at_end(fit)"]
//!
//! [[sample]]
//! sample = "whole"
//! observations = 63413
//! ```

use crate::canonical::VariableOrder;
use crate::category::Sample;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} must list at least one variable")]
    EmptyOrder(&'static str),

    #[error("Duplicate variable '{name}' in {list}")]
    DuplicateVariable { list: &'static str, name: String },

    #[error("Observation count {0} is mapped to more than one sample")]
    DuplicateObservations(u64),

    #[error("Sample '{0}' has more than one observation count")]
    DuplicateSample(Sample),

    #[error("Observation counts cannot be mapped to the 'unknown' sample")]
    UnknownSample,
}

/// Exact observation count identifying an estimation sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleThreshold {
    pub sample: Sample,
    pub observations: u64,
}

const DEFAULT_TOML: &str = include_str!("../presentation-default.toml");

static BUILTIN: Lazy<PresentationConfig> = Lazy::new(|| {
    PresentationConfig::builtin().expect("embedded presentation-default.toml is valid")
});

/// Presentation settings for selection and assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Conventional order of baseline regressors
    pub baseline_order: Vec<String>,

    /// Instrument regressors prepended for instrumented layouts
    pub instrument_order: Vec<String>,

    /// Observation counts identifying estimation samples
    #[serde(rename = "sample")]
    pub samples: Vec<SampleThreshold>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl PresentationConfig {
    /// Parse the configuration embedded from `presentation-default.toml`
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_TOML)
    }

    /// Load and validate a configuration file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PresentationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_order("baseline_order", &self.baseline_order)?;
        check_order("instrument_order", &self.instrument_order)?;

        let mut counts = HashSet::new();
        let mut samples = HashSet::new();
        for threshold in &self.samples {
            if threshold.sample == Sample::Unknown {
                return Err(ConfigError::UnknownSample);
            }
            if !counts.insert(threshold.observations) {
                return Err(ConfigError::DuplicateObservations(threshold.observations));
            }
            if !samples.insert(threshold.sample) {
                return Err(ConfigError::DuplicateSample(threshold.sample));
            }
        }

        Ok(())
    }

    /// Identify the estimation sample from an exact observation count
    pub fn sample_for(&self, observations: Option<u64>) -> Sample {
        observations
            .and_then(|n| self.samples.iter().find(|t| t.observations == n))
            .map_or(Sample::Unknown, |t| t.sample)
    }

    /// Variable ranks derived from the priority lists
    pub fn variable_order(&self) -> VariableOrder {
        VariableOrder::new(self.baseline_order.as_slice(), self.instrument_order.as_slice())
    }
}

fn check_order(list: &'static str, names: &[String]) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::EmptyOrder(list));
    }
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(crate::canonical::normalize_name(name)) {
            return Err(ConfigError::DuplicateVariable {
                list,
                name: name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = PresentationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.samples.len(), 3);
        assert_eq!(config.instrument_order[0], "wealth_at_end(fit)");
    }

    #[test]
    fn test_default_is_embedded_file() {
        let config = PresentationConfig::builtin().unwrap();
        assert_eq!(config, PresentationConfig::default());
        assert_eq!(config.baseline_order.len(), 16);
        assert_eq!(config.baseline_order[0], "avg_ui_linear");
        assert_eq!(config.baseline_order[15], "(intercept)");
        assert_eq!(
            config.instrument_order,
            vec!["wealth_at_end(fit)", "amount_scp", "amount_lottery_in", "amount_lottery_out"]
        );
    }

    #[test]
    fn test_default_variable_order_follows_embedded_lists() {
        let order = VariableOrder::default();
        assert_eq!(order.rank("avg_ui_linear", false), Some(0));
        assert_eq!(order.rank("(Intercept)", false), Some(15));
        assert_eq!(order.rank("wealth_at_end(fit)", true), Some(0));
        assert_eq!(order.rank("avg_ui_linear", true), Some(4));
    }

    #[test]
    fn test_sample_for_exact_counts() {
        let config = PresentationConfig::default();
        assert_eq!(config.sample_for(Some(63413)), Sample::Whole);
        assert_eq!(config.sample_for(Some(17553)), Sample::LotteryScp);
        assert_eq!(config.sample_for(Some(6289)), Sample::LotteryOnly);
        assert_eq!(config.sample_for(Some(63412)), Sample::Unknown);
        assert_eq!(config.sample_for(None), Sample::Unknown);
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
baseline_order = ["age", "age2"]
instrument_order = ["amount_scp"]

[[sample]]
sample = "lottery_only"
observations = 100
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = PresentationConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.baseline_order, vec!["age", "age2"]);
        assert_eq!(config.sample_for(Some(100)), Sample::LotteryOnly);
        assert_eq!(config.sample_for(Some(6289)), Sample::Unknown);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = PresentationConfig::from_toml("/nonexistent/presentation.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = PresentationConfig::from_toml_str("baseline_order = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_order_rejected() {
        let err = PresentationConfig::from_toml_str(
            "baseline_order = []\ninstrument_order = [\"x\"]\nsample = []",
        )
        .unwrap_err();
        assert!(err.to_string().contains("baseline_order"));
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let err = PresentationConfig::from_toml_str(
            "baseline_order = [\"Age\", \"`age`\"]\ninstrument_order = [\"x\"]\nsample = []",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate variable"));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_duplicate_thresholds_rejected() {
        let mut config = PresentationConfig::default();
        config.samples.push(SampleThreshold {
            sample: Sample::Whole,
            observations: 1,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateSample(Sample::Whole))
        ));

        let mut config = PresentationConfig::default();
        config.samples[1].observations = 63413;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateObservations(63413))
        ));
    }

    #[test]
    fn test_unknown_sample_rejected() {
        let mut config = PresentationConfig::default();
        config.samples[0].sample = Sample::Unknown;
        assert!(matches!(config.validate(), Err(ConfigError::UnknownSample)));
    }
}
