//! Segmentation engines
//!
//! Two engines share one interface: the rule-based punctuation tokenizer used
//! when no model is available, and the label-decoding tokenizer that turns
//! per-token boundary labels from a [`LabelPredictor`] into words.

use crate::error::Result;
use serde::Serialize;
use std::fmt;

pub mod label_decoding;
#[cfg(feature = "neural")]
pub mod neural;
pub mod rule_based;

pub use label_decoding::{decode_labels, LabelDecodingSegmenter, LabelPredictor, TokenLabels};
#[cfg(feature = "neural")]
pub use neural::BertLabelPredictor;
pub use rule_based::{is_punctuation, RuleBasedSegmenter, PUNCTUATION};

/// Which engine is segmenting a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Neural label-decoding engine
    Advanced,
    /// Rule-based punctuation engine
    Fallback,
}

impl EngineKind {
    /// Lowercase name of the engine
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Advanced => "advanced",
            EngineKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns chunks of text into ordered segments
pub trait Segmenter {
    /// Segment a single chunk
    fn segment(&mut self, chunk: &str) -> Result<Vec<String>>;

    /// Segment a sequence of chunks, returning one segment list per chunk in
    /// the same order
    fn segment_all(&mut self, chunks: &[&str]) -> Result<Vec<Vec<String>>> {
        chunks.iter().map(|chunk| self.segment(chunk)).collect()
    }

    /// The kind of engine
    fn kind(&self) -> EngineKind;
}

/// The engine chosen for a run
#[derive(Debug)]
pub enum SegmentationEngine {
    /// Rule-based punctuation tokenizer
    RuleBased(RuleBasedSegmenter),
    /// Neural label-decoding tokenizer
    LabelDecoding(LabelDecodingSegmenter),
}

impl SegmentationEngine {
    /// The rule-based engine
    pub fn rule_based() -> Self {
        SegmentationEngine::RuleBased(RuleBasedSegmenter::new())
    }
}

impl Segmenter for SegmentationEngine {
    fn segment(&mut self, chunk: &str) -> Result<Vec<String>> {
        match self {
            SegmentationEngine::RuleBased(engine) => engine.segment(chunk),
            SegmentationEngine::LabelDecoding(engine) => engine.segment(chunk),
        }
    }

    fn segment_all(&mut self, chunks: &[&str]) -> Result<Vec<Vec<String>>> {
        match self {
            SegmentationEngine::RuleBased(engine) => engine.segment_all(chunks),
            SegmentationEngine::LabelDecoding(engine) => engine.segment_all(chunks),
        }
    }

    fn kind(&self) -> EngineKind {
        match self {
            SegmentationEngine::RuleBased(engine) => engine.kind(),
            SegmentationEngine::LabelDecoding(engine) => engine.kind(),
        }
    }
}
