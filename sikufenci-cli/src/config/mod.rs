//! Configuration module
//!
//! Values come from three layers: built-in defaults, an optional TOML file
//! given with `--config`, and command-line arguments. Later layers win.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sikufenci_engine::config::{
    DEFAULT_EVAL_BATCH_SIZE, DEFAULT_MAX_SEQ_LENGTH, DEFAULT_MODEL_DIR, DEFAULT_TEXT_FIELD,
};
use sikufenci_engine::{EnginePreference, PipelineConfig, PipelineConfigBuilder};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// CLI configuration structure
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Chunking and batching
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Neural model
    #[serde(default)]
    pub model: ModelConfig,

    /// JSON input
    #[serde(default)]
    pub json: JsonConfig,
}

/// Segmentation-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentationConfig {
    /// Maximum chunk length in characters
    pub max_seq_length: usize,

    /// Chunks per inference batch
    pub eval_batch_size: usize,

    /// Remove control characters before chunking
    pub strip_control_chars: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_seq_length: DEFAULT_MAX_SEQ_LENGTH,
            eval_batch_size: DEFAULT_EVAL_BATCH_SIZE,
            strip_control_chars: false,
        }
    }
}

/// Model-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Directory holding the model files
    pub dir: PathBuf,

    /// Which engine to try
    pub engine: EngineChoice,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_MODEL_DIR),
            engine: EngineChoice::Auto,
        }
    }
}

/// JSON input configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JsonConfig {
    /// Field holding the text of each record
    pub text_field: String,

    /// Maximum number of documents to process
    pub max_files: Option<usize>,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            max_files: None,
        }
    }
}

/// Engine choice as written on the command line or in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineChoice {
    /// Neural engine when available, rule-based otherwise
    #[default]
    Auto,
    /// Rule-based engine only
    Rule,
}

impl From<EngineChoice> for EnginePreference {
    fn from(choice: EngineChoice) -> Self {
        match choice {
            EngineChoice::Auto => EnginePreference::Auto,
            EngineChoice::Rule => EnginePreference::RuleBased,
        }
    }
}

/// Per-run values given on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Maximum chunk length
    pub max_seq_length: Option<usize>,
    /// Inference batch size
    pub eval_batch_size: Option<usize>,
    /// JSON text field
    pub text_field: Option<String>,
    /// JSON document cap
    pub max_files: Option<usize>,
    /// Model directory
    pub model_dir: Option<PathBuf>,
    /// Engine choice
    pub engine: Option<EngineChoice>,
}

impl CliConfig {
    /// Load a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::FileNotFound(path.display().to_string()).into());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&raw)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Parse TOML configuration text
    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| CliError::ConfigError(e.message().to_string()).into())
    }

    /// Builder seeded with the file values
    pub fn pipeline_builder(&self) -> PipelineConfigBuilder {
        PipelineConfig::builder()
            .max_seq_length(self.segmentation.max_seq_length)
            .eval_batch_size(self.segmentation.eval_batch_size)
            .strip_control_chars(self.segmentation.strip_control_chars)
            .model_dir(self.model.dir.clone())
            .engine(self.model.engine.into())
            .text_field(self.json.text_field.clone())
            .max_files(self.json.max_files)
    }

    /// Pipeline configuration with `overrides` applied on top of the file
    pub fn resolve(&self, overrides: Overrides) -> Result<PipelineConfig> {
        let mut builder = self.pipeline_builder();
        if let Some(length) = overrides.max_seq_length {
            builder = builder.max_seq_length(length);
        }
        if let Some(size) = overrides.eval_batch_size {
            builder = builder.eval_batch_size(size);
        }
        if let Some(field) = overrides.text_field {
            builder = builder.text_field(field);
        }
        if overrides.max_files.is_some() {
            builder = builder.max_files(overrides.max_files);
        }
        if let Some(dir) = overrides.model_dir {
            builder = builder.model_dir(dir);
        }
        if let Some(engine) = overrides.engine {
            builder = builder.engine(engine.into());
        }
        Ok(builder.build()?)
    }
}
