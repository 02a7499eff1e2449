//! Result assembly module
//!
//! Joins per-chunk segments back into one line per non-blank input line.

use crate::chunker::TextChunk;
use std::borrow::Borrow;

/// Separator between segments of a line
pub const SEGMENT_SEPARATOR: &str = "/";

/// Separator between lines of a result document
pub const LINE_SEPARATOR: &str = "\n";

/// Assembler for segmented output
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultAssembler;

impl ResultAssembler {
    /// Create a new result assembler
    pub fn new() -> Self {
        Self
    }

    /// Join segments into one segmented line
    pub fn join_segments<S: Borrow<str>>(&self, segments: &[S]) -> String {
        segments.join(SEGMENT_SEPARATOR)
    }

    /// Join segmented lines into a result document body
    pub fn join_lines<S: Borrow<str>>(&self, lines: &[S]) -> String {
        lines.join(LINE_SEPARATOR)
    }

    /// Regroup per-chunk segments by source line and join them
    ///
    /// `segments[i]` belongs to `chunks[i]`. Consecutive chunks of the same
    /// line are merged into a single segmented line.
    pub fn assemble(&self, chunks: &[TextChunk<'_>], segments: Vec<Vec<String>>) -> String {
        let mut lines = Vec::new();
        let mut current_line = None;
        let mut current = Vec::new();

        for (chunk, chunk_segments) in chunks.iter().zip(segments) {
            if current_line != Some(chunk.line) {
                if current_line.is_some() {
                    lines.push(self.join_segments(&current));
                    current.clear();
                }
                current_line = Some(chunk.line);
            }
            current.extend(chunk_segments);
        }

        if current_line.is_some() {
            lines.push(self.join_segments(&current));
        }

        self.join_lines(&lines)
    }
}
