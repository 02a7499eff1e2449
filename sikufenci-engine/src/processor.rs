//! Pipeline orchestrator
//!
//! Runs every document through chunker, segmentation engine and assembler,
//! one document at a time. A failure in any document aborts the rest of the
//! run. The engine, and with it any loaded model, is released when
//! [`Pipeline::run`] returns, whichever way it returns.

use crate::{
    assembler::ResultAssembler,
    chunker::{strip_control_chars, ChunkManager},
    config::PipelineConfig,
    error::Result,
    input::Document,
    output::ResultSink,
    segmenter::{EngineKind, SegmentationEngine, Segmenter},
    selector::{select_engine, EngineSelection},
};
use serde::Serialize;
use std::borrow::Cow;

/// Receives progress notifications from a run
pub trait ProgressObserver {
    /// The run is about to start with the given engine
    fn run_started(&mut self, _engine: EngineKind) {}

    /// A document is about to be processed
    fn document_started(&mut self, _id: &str) {}

    /// A document had no text to segment and was skipped
    fn document_skipped(&mut self, _id: &str) {}

    /// A document was segmented and written
    fn document_completed(&mut self, _id: &str, _lines: usize) {}

    /// The run completed
    fn run_finished(&mut self, _summary: &RunSummary) {}
}

/// Observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Counters of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Engine used for the run
    pub engine: EngineKind,
    /// Documents segmented and written
    pub processed: usize,
    /// Documents skipped because they had no text
    pub skipped_empty: usize,
    /// Segmented lines written
    pub lines: usize,
    /// Chunks passed to the engine
    pub chunks: usize,
}

impl RunSummary {
    fn new(engine: EngineKind) -> Self {
        Self {
            engine,
            processed: 0,
            skipped_empty: 0,
            lines: 0,
            chunks: 0,
        }
    }
}

/// Segmented form of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedText {
    /// Result document body
    pub body: String,
    /// Number of segmented lines
    pub lines: usize,
    /// Number of chunks segmented
    pub chunks: usize,
}

/// Chunk → segment → assemble pipeline bound to one engine
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    chunker: ChunkManager,
    assembler: ResultAssembler,
    engine: SegmentationEngine,
    fallback_reason: Option<String>,
}

impl Pipeline {
    /// Create a pipeline around an already selected engine
    pub fn new(config: PipelineConfig, engine: SegmentationEngine) -> Result<Self> {
        config.validate()?;
        let chunker = ChunkManager::new(config.max_seq_length)?;
        Ok(Self {
            config,
            chunker,
            assembler: ResultAssembler::new(),
            engine,
            fallback_reason: None,
        })
    }

    /// Create a pipeline, selecting the engine from `config`
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let EngineSelection {
            engine,
            fallback_reason,
        } = select_engine(&config);
        let mut pipeline = Self::new(config, engine)?;
        pipeline.fallback_reason = fallback_reason;
        Ok(pipeline)
    }

    /// The engine in use
    pub fn engine_kind(&self) -> EngineKind {
        self.engine.kind()
    }

    /// Why the neural engine was abandoned, if it was attempted and failed
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    /// The configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Segment one text. Returns `None` when it has no non-blank line.
    pub fn segment_text(&mut self, text: &str) -> Result<Option<SegmentedText>> {
        let text = if self.config.strip_control_chars {
            strip_control_chars(text)
        } else {
            Cow::Borrowed(text)
        };

        let chunks = self.chunker.chunk_text(&text);
        if chunks.is_empty() {
            return Ok(None);
        }

        let chunk_texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text).collect();
        let segments = self.engine.segment_all(&chunk_texts)?;
        let lines = chunks.last().map(|chunk| chunk.line + 1).unwrap_or(0);

        Ok(Some(SegmentedText {
            body: self.assembler.assemble(&chunks, segments),
            lines,
            chunks: chunks.len(),
        }))
    }

    /// Segment every document and write the results to `sink`
    ///
    /// Stops at the first error, whether it comes from reading a document or
    /// from segmenting or writing one, and returns it. Processing stops once
    /// `max_files` documents have been written.
    pub fn run<I, S, O>(mut self, documents: I, sink: &mut S, observer: &mut O) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Document>>,
        S: ResultSink + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        let mut summary = RunSummary::new(self.engine.kind());
        observer.run_started(summary.engine);
        log::info!("segmentation run started with {} engine", summary.engine);

        for document in documents {
            if self
                .config
                .max_files
                .is_some_and(|limit| summary.processed >= limit)
            {
                log::info!("reached limit of {} documents", summary.processed);
                break;
            }

            let document = document?;
            observer.document_started(&document.id);
            log::debug!("segmenting {}", document.id);

            let segmented = match self.segment_text(&document.text) {
                Ok(Some(segmented)) => segmented,
                Ok(None) => {
                    log::info!("{} is empty, skipping", document.id);
                    summary.skipped_empty += 1;
                    observer.document_skipped(&document.id);
                    continue;
                }
                Err(err) => return Err(err.in_document(&document.id)),
            };

            sink.write(&document.id, &segmented.body)
                .map_err(|err| err.in_document(&document.id))?;

            summary.processed += 1;
            summary.lines += segmented.lines;
            summary.chunks += segmented.chunks;
            observer.document_completed(&document.id, segmented.lines);
        }

        log::info!(
            "segmentation run finished: {} processed, {} empty",
            summary.processed,
            summary.skipped_empty
        );
        observer.run_finished(&summary);
        Ok(summary)
    }
}
