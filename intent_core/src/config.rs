//! Controller configuration
//!
//! Loaded from TOML, every field optional with a default:
//!
//! ```toml
//! [detection]
//! pattern_confidence = 0.9
//! keyword_confidence = 0.7
//! default_confidence = 0.5
//! whole_word_bonus = 0.5
//! fallback_intent = "search"
//!
//! [calculator]
//! max_operands = 10
//! precision = 6
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Intent;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0} ({1})")]
    FileNotFound(String, String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub calculator: CalculatorConfig,
}

/// Detection cascade tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Confidence reported for a pattern match
    #[serde(default = "default_pattern_confidence")]
    pub pattern_confidence: f64,

    /// Confidence reported for a keyword match
    #[serde(default = "default_keyword_confidence")]
    pub keyword_confidence: f64,

    /// Confidence reported when both stages miss
    #[serde(default = "default_default_confidence")]
    pub default_confidence: f64,

    /// Extra score for a keyword that appears as a whole word
    #[serde(default = "default_whole_word_bonus")]
    pub whole_word_bonus: f64,

    /// Intent returned when nothing matches; must be a direct-answer intent
    #[serde(default = "default_fallback_intent")]
    pub fallback_intent: Intent,
}

fn default_pattern_confidence() -> f64 {
    0.9
}
fn default_keyword_confidence() -> f64 {
    0.7
}
fn default_default_confidence() -> f64 {
    0.5
}
fn default_whole_word_bonus() -> f64 {
    0.5
}
fn default_fallback_intent() -> Intent {
    Intent::Search
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            pattern_confidence: default_pattern_confidence(),
            keyword_confidence: default_keyword_confidence(),
            default_confidence: default_default_confidence(),
            whole_word_bonus: default_whole_word_bonus(),
            fallback_intent: default_fallback_intent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Upper bound on operands per calculation
    #[serde(default = "default_max_operands")]
    pub max_operands: usize,

    /// Decimal places kept for non-integral results
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_max_operands() -> usize {
    10
}
fn default_precision() -> u32 {
    6
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_operands: default_max_operands(),
            precision: default_precision(),
        }
    }
}

impl ControllerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(path.as_ref().display().to_string(), e.to_string())
        })?;

        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_detection()?;
        self.validate_calculator()?;
        Ok(())
    }

    fn validate_detection(&self) -> Result<(), ConfigError> {
        let detection = &self.detection;

        let confidences = [
            ("detection.pattern_confidence", detection.pattern_confidence),
            ("detection.keyword_confidence", detection.keyword_confidence),
            ("detection.default_confidence", detection.default_confidence),
        ];
        for (field, value) in confidences {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("{} is outside [0, 1]", value),
                });
            }
        }

        if !detection.whole_word_bonus.is_finite() || detection.whole_word_bonus < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "detection.whole_word_bonus".to_string(),
                message: "must be a non-negative number".to_string(),
            });
        }

        if detection.fallback_intent.endpoint().is_some() {
            return Err(ConfigError::InvalidValue {
                field: "detection.fallback_intent".to_string(),
                message: format!(
                    "'{}' calls an endpoint; use a direct-answer intent (search or unknown)",
                    detection.fallback_intent
                ),
            });
        }

        Ok(())
    }

    fn validate_calculator(&self) -> Result<(), ConfigError> {
        if self.calculator.max_operands == 0 {
            return Err(ConfigError::InvalidValue {
                field: "calculator.max_operands".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.calculator.precision > 15 {
            return Err(ConfigError::InvalidValue {
                field: "calculator.precision".to_string(),
                message: "f64 cannot represent more than 15 decimal places reliably".to_string(),
            });
        }

        Ok(())
    }
}
