//! Engine selection and degradation policy
//!
//! A run starts in the advanced state only when neural support is available.
//! The predictor is then built eagerly; any failure moves the run to the
//! fallback engine for good. Nothing is retried, and one run never mixes
//! engines.

use crate::config::{EnginePreference, PipelineConfig};
use crate::error::Result;
use crate::segmenter::{
    EngineKind, LabelDecodingSegmenter, LabelPredictor, SegmentationEngine, Segmenter,
};

/// Whether this build carries the neural engine
pub fn neural_support_compiled() -> bool {
    cfg!(feature = "neural")
}

/// Outcome of engine selection
#[derive(Debug)]
pub struct EngineSelection {
    /// The engine for the whole run
    pub engine: SegmentationEngine,
    /// Why the advanced engine was abandoned, if it was attempted
    pub fallback_reason: Option<String>,
}

impl EngineSelection {
    /// The selected state
    pub fn kind(&self) -> EngineKind {
        self.engine.kind()
    }
}

/// Choose the engine for a run
///
/// `init` is only called when `neural_available` is true. Its error, or a
/// failure to wrap the predictor, selects the rule-based engine.
pub fn resolve_engine<F>(neural_available: bool, batch_size: usize, init: F) -> EngineSelection
where
    F: FnOnce() -> Result<Box<dyn LabelPredictor>>,
{
    if !neural_available {
        log::info!("neural engine not available, using rule-based engine");
        return EngineSelection {
            engine: SegmentationEngine::rule_based(),
            fallback_reason: None,
        };
    }

    match init().and_then(|predictor| LabelDecodingSegmenter::new(predictor, batch_size)) {
        Ok(segmenter) => {
            log::info!("using neural engine (batch size {batch_size})");
            EngineSelection {
                engine: SegmentationEngine::LabelDecoding(segmenter),
                fallback_reason: None,
            }
        }
        Err(err) => {
            log::warn!("neural engine initialisation failed: {err}; using rule-based engine");
            EngineSelection {
                engine: SegmentationEngine::rule_based(),
                fallback_reason: Some(err.to_string()),
            }
        }
    }
}

/// Build the neural predictor described by `config`
#[cfg(feature = "neural")]
pub fn load_predictor(config: &PipelineConfig) -> Result<Box<dyn LabelPredictor>> {
    let predictor =
        crate::segmenter::BertLabelPredictor::load(&config.model_dir, config.max_seq_length)?;
    Ok(Box::new(predictor))
}

/// Build the neural predictor described by `config`
#[cfg(not(feature = "neural"))]
pub fn load_predictor(_config: &PipelineConfig) -> Result<Box<dyn LabelPredictor>> {
    Err(crate::error::EngineError::NeuralUnavailable(
        "built without the `neural` feature".to_string(),
    ))
}

/// Select the engine for `config` using the compiled-in predictor
pub fn select_engine(config: &PipelineConfig) -> EngineSelection {
    let available = neural_support_compiled() && config.engine == EnginePreference::Auto;
    resolve_engine(available, config.eval_batch_size, || load_predictor(config))
}
