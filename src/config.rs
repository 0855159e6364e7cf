//! Configuration for textlens.
//!
//! Configuration sources (highest priority first):
//! 1. `--config <path>` CLI flag
//! 2. `TEXTLENS_CONFIG` environment variable
//! 3. `textlens.yaml` in the current directory
//! 4. Built-in defaults
//!
//! A missing default file falls back to defaults; an explicitly named
//! file that cannot be read or parsed is fatal.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::retry::RetryPolicy;

/// Default config file name searched in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "textlens.yaml";

/// Top-level configuration (matches the YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Retry policy applied to every pipeline stage
    #[serde(default)]
    pub retry: RetryConfig,

    /// Model server and model identifiers
    #[serde(default)]
    pub models: ModelsConfig,

    /// Pipeline execution settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `retry` section
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per stage, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base multiplier in seconds (default: 1.0)
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Floor on the backoff delay in seconds (default: 1.0)
    #[serde(default = "default_min_time_multiplier")]
    pub min_time_multiplier: f64,

    /// Ceiling on the backoff delay in seconds (default: 10.0)
    #[serde(default = "default_max_time_multiplier")]
    pub max_time_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_factor() -> f64 {
    1.0
}
fn default_min_time_multiplier() -> f64 {
    1.0
}
fn default_max_time_multiplier() -> f64 {
    10.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_factor: default_backoff_factor(),
            min_time_multiplier: default_min_time_multiplier(),
            max_time_multiplier: default_max_time_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Build the retry policy these fields describe
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_multiplier: self.backoff_factor,
            min_wait_seconds: self.min_time_multiplier,
            max_wait_seconds: self.max_time_multiplier,
        }
    }
}

/// `models` section
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Base URL of the model server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model used by the tokenization stage
    #[serde(default = "default_tokenizer_model")]
    pub tokenizer_model: String,

    /// Model used by the embedding stage
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Model used by the sentiment stage
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_tokenizer_model() -> String {
    "bert-base-uncased".to_string()
}
fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}
fn default_sentiment_model() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            tokenizer_model: default_tokenizer_model(),
            embedding_model: default_embedding_model(),
            sentiment_model: default_sentiment_model(),
        }
    }
}

/// `pipeline` section
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Deadline per stage attempt in seconds (default: 300)
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_seconds: u64,
}

fn default_stage_timeout() -> u64 {
    300
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout_seconds: default_stage_timeout(),
        }
    }
}

/// Malformed or missing configuration; fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("retry.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("retry.backoff_factor must be non-negative, got {0}")]
    NegativeBackoff(f64),

    #[error("retry wait bounds inverted: min {min} > max {max}")]
    InvertedWaitBounds { min: f64, max: f64 },

    #[error("models.endpoint cannot be empty")]
    EmptyEndpoint,

    #[error("pipeline.stage_timeout_seconds must be at least 1")]
    ZeroStageTimeout,
}

impl Config {
    /// Load configuration.
    ///
    /// `path` is the explicit `--config` value; when absent the
    /// `TEXTLENS_CONFIG` env var and then `textlens.yaml` are tried. If
    /// no file exists anywhere, defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match resolve_config_path(path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from YAML content
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Validate field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts < 1 {
            return Err(ConfigError::ZeroAttempts);
        }

        if self.retry.backoff_factor < 0.0 {
            return Err(ConfigError::NegativeBackoff(self.retry.backoff_factor));
        }

        if self.retry.min_time_multiplier > self.retry.max_time_multiplier {
            return Err(ConfigError::InvertedWaitBounds {
                min: self.retry.min_time_multiplier,
                max: self.retry.max_time_multiplier,
            });
        }

        if self.models.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }

        if self.pipeline.stage_timeout_seconds < 1 {
            return Err(ConfigError::ZeroStageTimeout);
        }

        Ok(())
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var("TEXTLENS_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}
