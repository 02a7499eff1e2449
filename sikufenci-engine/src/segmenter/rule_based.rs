//! Rule-based punctuation tokenizer
//!
//! The fallback engine when no model is available. It knows nothing about
//! words: a segment is any maximal run of characters between whitespace and
//! the full-width punctuation marks below.
//! - whitespace ends the current segment and is dropped
//! - a punctuation mark ends the current segment and becomes its own segment
//! - anything else extends the current segment

use super::{EngineKind, Segmenter};
use crate::chunker::is_space;
use crate::error::Result;

/// Full-width punctuation marks treated as standalone segments
pub const PUNCTUATION: &[char] = &[
    '，', '。', '！', '？', '：', '；', '“', '”', '‘', '’', '（', '）', '【', '】', '《', '》', '「',
    '」', '『', '』', '〈', '〉',
];

/// Whether `ch` is one of the [`PUNCTUATION`] marks
pub fn is_punctuation(ch: char) -> bool {
    PUNCTUATION.contains(&ch)
}

/// How the tokenizer treats a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Accumulated into the pending segment
    Ordinary,
    /// Ends the pending segment, then dropped
    Whitespace,
    /// Ends the pending segment, then emitted alone
    Punctuation,
}

impl CharClass {
    /// Classify a character
    pub fn of(ch: char) -> Self {
        if is_space(ch) {
            CharClass::Whitespace
        } else if is_punctuation(ch) {
            CharClass::Punctuation
        } else {
            CharClass::Ordinary
        }
    }
}

/// Greedy single-pass punctuation tokenizer
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSegmenter;

impl RuleBasedSegmenter {
    /// Create a new tokenizer
    pub fn new() -> Self {
        Self
    }

    /// Split `chunk` into segments. Never fails; empty input gives no segments.
    pub fn tokenize(&self, chunk: &str) -> Vec<String> {
        let mut segments = Vec::new();
        let mut pending = String::new();

        for ch in chunk.chars() {
            match CharClass::of(ch) {
                CharClass::Ordinary => pending.push(ch),
                CharClass::Whitespace => flush(&mut pending, &mut segments),
                CharClass::Punctuation => {
                    flush(&mut pending, &mut segments);
                    segments.push(ch.to_string());
                }
            }
        }
        flush(&mut pending, &mut segments);

        segments
    }
}

fn flush(pending: &mut String, segments: &mut Vec<String>) {
    if !pending.is_empty() {
        segments.push(std::mem::take(pending));
    }
}

impl Segmenter for RuleBasedSegmenter {
    fn segment(&mut self, chunk: &str) -> Result<Vec<String>> {
        Ok(self.tokenize(chunk))
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Fallback
    }
}
