//! Text chunking utilities
//!
//! Input text is split into lines, blank lines are dropped, and every
//! remaining line is cut into slices of at most `max_len` characters. The
//! slicing is purely positional: it counts Unicode scalar values and never
//! looks for word boundaries, but it never cuts through a UTF-8 sequence.

use crate::error::{EngineError, Result};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// A chunk of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunk<'a> {
    /// Index of the non-blank line this chunk was cut from
    pub line: usize,
    /// The chunk text
    pub text: &'a str,
}

/// Splits text into bounded-length chunks
#[derive(Debug, Clone, Copy)]
pub struct ChunkManager {
    max_len: usize,
}

impl ChunkManager {
    /// Create a chunk manager producing chunks of at most `max_len` characters
    pub fn new(max_len: usize) -> Result<Self> {
        if max_len == 0 {
            return Err(EngineError::ConfigError(
                "chunk length must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_len })
    }

    /// Maximum chunk length in characters
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Lazily chunk `text`
    ///
    /// Each call returns a fresh iterator, so the same text can be chunked
    /// any number of times.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            lines: text.split('\n'),
            max_len: self.max_len,
            next_line: 0,
            current: None,
        }
    }

    /// Chunk `text` into a vector
    pub fn chunk_text<'a>(&self, text: &'a str) -> Vec<TextChunk<'a>> {
        self.chunks(text).collect()
    }
}

/// Iterator over the chunks of a text, see [`ChunkManager::chunks`]
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    lines: std::str::Split<'a, char>,
    max_len: usize,
    next_line: usize,
    current: Option<(usize, &'a str)>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = TextChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((line, rest)) = self.current {
                if !rest.is_empty() {
                    let (head, tail) = rest.split_at(char_split_point(rest, self.max_len));
                    self.current = Some((line, tail));
                    return Some(TextChunk { line, text: head });
                }
                self.current = None;
            }

            let trimmed = self.lines.next()?.trim_matches(is_space);
            if trimmed.is_empty() {
                continue;
            }

            self.current = Some((self.next_line, trimmed));
            self.next_line += 1;
        }
    }
}

/// Whitespace as the segmenters see it: Unicode whitespace plus the
/// information separators U+001C to U+001F
pub fn is_space(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\u{1c}'..='\u{1f}')
}

/// Byte offset just past the first `max_chars` characters of `text`
fn char_split_point(text: &str, max_chars: usize) -> usize {
    text.char_indices()
        .nth(max_chars)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

fn control_chars() -> &'static Regex {
    static CONTROL: OnceLock<Regex> = OnceLock::new();
    CONTROL.get_or_init(|| {
        Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f-\x9f]").expect("control character pattern")
    })
}

/// Remove invisible control characters, keeping tab, newline and carriage return
pub fn strip_control_chars(text: &str) -> Cow<'_, str> {
    control_chars().replace_all(text, "")
}
