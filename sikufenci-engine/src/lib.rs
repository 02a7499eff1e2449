//! Classical Chinese word segmentation
//!
//! This crate provides the segmentation pipeline: line chunking, the
//! rule-based and label-decoding segmentation engines, engine selection
//! with fallback, result assembly, and the document sources and sinks a
//! run reads from and writes to.

#![warn(missing_docs)]

pub mod assembler;
pub mod chunker;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processor;
pub mod segmenter;
pub mod selector;

// Re-export key types
pub use assembler::ResultAssembler;
pub use chunker::{strip_control_chars, ChunkManager, TextChunk};
pub use config::{EnginePreference, PipelineConfig, PipelineConfigBuilder};
pub use error::{EngineError, Result};
pub use input::{poem_file_name, Document, JsonCorpus, JsonStats, TextDirectory};
pub use output::{DirectorySink, MemorySink, ResultSink};
pub use processor::{NoopObserver, Pipeline, ProgressObserver, RunSummary, SegmentedText};
pub use segmenter::{
    decode_labels, EngineKind, LabelDecodingSegmenter, LabelPredictor, RuleBasedSegmenter,
    SegmentationEngine, Segmenter, TokenLabels,
};
pub use selector::{neural_support_compiled, resolve_engine, select_engine, EngineSelection};
