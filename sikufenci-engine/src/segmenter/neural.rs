//! BERT token-classification predictor using Candle
//!
//! Expects a model directory holding:
//! - `config.json` (BERT configuration, `num_labels` or `id2label`)
//! - `model.safetensors` or `pytorch_model.bin`
//! - `tokenizer.json` or a WordPiece `vocab.txt`
//!
//! Inference always runs on the CPU. Every row of a batch is padded to
//! `max_seq_length`, so a chunk's labels never depend on its batch mates.

use super::label_decoding::{LabelPredictor, TokenLabels, CLS_TOKEN, PAD_TOKEN, SEP_TOKEN};
use crate::error::{EngineError, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::fs;
use std::path::{Path, PathBuf};
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::Tokenizer;

/// Label count of the published segmentation checkpoints
const DEFAULT_NUM_LABELS: usize = 9;

struct LoadedModel {
    bert: BertModel,
    classifier: Linear,
}

/// Predicts word-boundary labels with a BERT token classifier
pub struct BertLabelPredictor {
    tokenizer: Tokenizer,
    model: Option<LoadedModel>,
    device: Device,
    model_dir: PathBuf,
    max_seq_length: usize,
    cls_id: u32,
    sep_id: u32,
    pad_id: u32,
}

fn unavailable(what: &str, err: impl std::fmt::Display) -> EngineError {
    EngineError::NeuralUnavailable(format!("{what}: {err}"))
}

fn inference(err: candle_core::Error) -> EngineError {
    EngineError::Inference(err.to_string())
}

impl BertLabelPredictor {
    /// Load tokenizer and model from `model_dir`
    pub fn load(model_dir: &Path, max_seq_length: usize) -> Result<Self> {
        if !model_dir.is_dir() {
            return Err(EngineError::NeuralUnavailable(format!(
                "model directory does not exist: {}",
                model_dir.display()
            )));
        }
        if max_seq_length < 3 {
            return Err(EngineError::ConfigError(
                "max_seq_length must leave room for [CLS] and [SEP]".to_string(),
            ));
        }

        log::info!("loading tokenizer from {}", model_dir.display());
        let tokenizer = load_tokenizer(model_dir)?;
        let special = |token: &str| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| unavailable("vocabulary", format!("missing {token}")))
        };
        let cls_id = special(CLS_TOKEN)?;
        let sep_id = special(SEP_TOKEN)?;
        let pad_id = special(PAD_TOKEN)?;

        log::info!("loading model from {}", model_dir.display());
        let device = Device::Cpu;
        let config_path = model_dir.join("config.json");
        let raw_config = fs::read_to_string(&config_path)
            .map_err(|e| unavailable(&format!("failed to read {}", config_path.display()), e))?;
        let config: Config = serde_json::from_str(&raw_config)
            .map_err(|e| unavailable("failed to parse config.json", e))?;
        let (hidden_size, num_labels) = classifier_shape(&raw_config)?;

        let vb = load_weights(model_dir, &device)?;
        let bert = BertModel::load(vb.pp("bert"), &config)
            .map_err(|e| unavailable("failed to build BERT encoder", e))?;
        let classifier = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))
            .map_err(|e| unavailable("failed to build classifier head", e))?;

        log::info!("model loaded ({num_labels} labels, cpu)");

        Ok(Self {
            tokenizer,
            model: Some(LoadedModel { bert, classifier }),
            device,
            model_dir: model_dir.to_path_buf(),
            max_seq_length,
            cls_id,
            sep_id,
            pad_id,
        })
    }

    /// Whether the model is still resident
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Tokenize one chunk, truncated to leave room for the two markers
    fn encode(&self, chunk: &str) -> Result<(Vec<String>, Vec<u32>)> {
        let encoding = self
            .tokenizer
            .encode(chunk, false)
            .map_err(|e| EngineError::Inference(format!("tokenization failed: {e}")))?;

        let keep = encoding.get_ids().len().min(self.max_seq_length - 2);
        if keep < encoding.get_ids().len() {
            log::warn!(
                "chunk truncated from {} to {keep} tokens to fit max_seq_length {}",
                encoding.get_ids().len(),
                self.max_seq_length
            );
        }
        let mut tokens = Vec::with_capacity(keep + 2);
        let mut ids = Vec::with_capacity(keep + 2);

        tokens.push(CLS_TOKEN.to_string());
        ids.push(self.cls_id);
        tokens.extend(encoding.get_tokens()[..keep].iter().cloned());
        ids.extend_from_slice(&encoding.get_ids()[..keep]);
        tokens.push(SEP_TOKEN.to_string());
        ids.push(self.sep_id);

        Ok((tokens, ids))
    }
}

impl LabelPredictor for BertLabelPredictor {
    fn predict(&mut self, chunks: &[&str]) -> Result<Vec<TokenLabels>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| EngineError::Inference("model has been released".to_string()))?;

        let width = self.max_seq_length;
        let mut encoded = Vec::with_capacity(chunks.len());
        let mut input_ids = Vec::with_capacity(chunks.len() * width);
        let mut attention = Vec::with_capacity(chunks.len() * width);

        for chunk in chunks {
            let (tokens, ids) = self.encode(chunk)?;
            attention.extend(std::iter::repeat(1u32).take(ids.len()));
            attention.extend(std::iter::repeat(0u32).take(width - ids.len()));
            input_ids.extend_from_slice(&ids);
            input_ids.extend(std::iter::repeat(self.pad_id).take(width - ids.len()));
            encoded.push(tokens);
        }

        let shape = (chunks.len(), width);
        let input_ids = Tensor::from_vec(input_ids, shape, &self.device).map_err(inference)?;
        let attention = Tensor::from_vec(attention, shape, &self.device).map_err(inference)?;
        let token_types = input_ids.zeros_like().map_err(inference)?;

        let hidden = model
            .bert
            .forward(&input_ids, &token_types, Some(&attention))
            .map_err(inference)?;
        let predictions = model
            .classifier
            .forward(&hidden)
            .and_then(|logits| logits.argmax(D::Minus1))
            .and_then(|labels| labels.to_dtype(DType::U32))
            .and_then(|labels| labels.to_vec2::<u32>())
            .map_err(inference)?;

        Ok(encoded
            .into_iter()
            .zip(predictions)
            .map(|(tokens, row)| {
                let labels = row[..tokens.len()].to_vec();
                TokenLabels { tokens, labels }
            })
            .collect())
    }

    fn release(&mut self) {
        if self.model.take().is_some() {
            log::info!("unloaded model from {}", self.model_dir.display());
        }
    }

    fn name(&self) -> &str {
        "BERT label predictor"
    }
}

fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_json = model_dir.join("tokenizer.json");
    if tokenizer_json.is_file() {
        return Tokenizer::from_file(&tokenizer_json)
            .map_err(|e| unavailable("failed to load tokenizer.json", e));
    }

    let vocab = model_dir.join("vocab.txt");
    if !vocab.is_file() {
        return Err(EngineError::NeuralUnavailable(format!(
            "no tokenizer.json or vocab.txt in {}",
            model_dir.display()
        )));
    }

    let wordpiece = WordPiece::from_file(&vocab.to_string_lossy())
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| unavailable("failed to load vocab.txt", e))?;
    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer.with_normalizer(Some(BertNormalizer::default()));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
    Ok(tokenizer)
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.is_file() {
        // SAFETY: the weights file is only read, never written, while mapped.
        #[allow(unsafe_code)]
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)
                .map_err(|e| unavailable("failed to map model.safetensors", e))?
        };
        return Ok(vb);
    }

    let pytorch = model_dir.join("pytorch_model.bin");
    if pytorch.is_file() {
        return VarBuilder::from_pth(&pytorch, DType::F32, device)
            .map_err(|e| unavailable("failed to load pytorch_model.bin", e));
    }

    Err(EngineError::NeuralUnavailable(format!(
        "no model.safetensors or pytorch_model.bin in {}",
        model_dir.display()
    )))
}

/// Hidden size and label count from the raw `config.json`
fn classifier_shape(raw_config: &str) -> Result<(usize, usize)> {
    let value: serde_json::Value = serde_json::from_str(raw_config)
        .map_err(|e| unavailable("failed to parse config.json", e))?;

    let hidden_size = value
        .get("hidden_size")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| unavailable("config.json", "missing hidden_size"))?;

    let num_labels = value
        .get("num_labels")
        .and_then(serde_json::Value::as_u64)
        .map(|n| n as usize)
        .or_else(|| {
            value
                .get("id2label")
                .and_then(serde_json::Value::as_object)
                .map(|labels| labels.len())
        })
        .unwrap_or(DEFAULT_NUM_LABELS);

    Ok((hidden_size as usize, num_labels))
}
