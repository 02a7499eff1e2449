//! Configuration types for the pipeline

use crate::error::{EngineError, Result};
use std::path::PathBuf;

/// Default chunk length in characters
pub const DEFAULT_MAX_SEQ_LENGTH: usize = 128;

/// Default number of chunks per inference batch
pub const DEFAULT_EVAL_BATCH_SIZE: usize = 3;

/// Default JSON field holding the text of a record
pub const DEFAULT_TEXT_FIELD: &str = "paragraphs";

/// Directory searched for the model when none is configured
pub const DEFAULT_MODEL_DIR: &str = "train_fenci_sikuroberta_vocabtxt";

/// Which engine a run should try to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnginePreference {
    /// Use the neural engine when available, fall back otherwise
    #[default]
    Auto,
    /// Always use the rule-based engine
    RuleBased,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Maximum chunk length in characters
    pub max_seq_length: usize,
    /// Number of chunks per neural inference batch
    pub eval_batch_size: usize,
    /// Cap on documents processed in one run (None = all)
    pub max_files: Option<usize>,
    /// JSON field holding the text of each record
    pub text_field: String,
    /// Remove ASCII/C1 control characters before chunking
    pub strip_control_chars: bool,
    /// Model directory for the neural engine
    pub model_dir: PathBuf,
    /// Engine preference
    pub engine: EnginePreference,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_seq_length: DEFAULT_MAX_SEQ_LENGTH,
            eval_batch_size: DEFAULT_EVAL_BATCH_SIZE,
            max_files: None,
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            strip_control_chars: false,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            engine: EnginePreference::Auto,
        }
    }
}

impl PipelineConfig {
    /// Start building a configuration
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Check the configuration for values no engine can work with
    pub fn validate(&self) -> Result<()> {
        if self.max_seq_length == 0 {
            return Err(EngineError::ConfigError(
                "max_seq_length must be at least 1".to_string(),
            ));
        }
        if self.eval_batch_size == 0 {
            return Err(EngineError::ConfigError(
                "eval_batch_size must be at least 1".to_string(),
            ));
        }
        if self.text_field.is_empty() {
            return Err(EngineError::ConfigError(
                "text_field cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chunk length
    pub fn max_seq_length(mut self, length: usize) -> Self {
        self.config.max_seq_length = length;
        self
    }

    /// Set the inference batch size
    pub fn eval_batch_size(mut self, size: usize) -> Self {
        self.config.eval_batch_size = size;
        self
    }

    /// Cap the number of JSON documents processed
    pub fn max_files(mut self, max_files: Option<usize>) -> Self {
        self.config.max_files = max_files;
        self
    }

    /// Set the JSON text field
    pub fn text_field<S: Into<String>>(mut self, field: S) -> Self {
        self.config.text_field = field.into();
        self
    }

    /// Enable control character removal
    pub fn strip_control_chars(mut self, enabled: bool) -> Self {
        self.config.strip_control_chars = enabled;
        self
    }

    /// Set the model directory
    pub fn model_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.model_dir = dir.into();
        self
    }

    /// Set the engine preference
    pub fn engine(mut self, engine: EnginePreference) -> Self {
        self.config.engine = engine;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
