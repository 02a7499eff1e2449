//! Document sources
//!
//! A [`Document`] is an output name paired with raw text. Documents come
//! from a directory of `.txt` files or from a JSON array of records.

pub mod json;
pub mod text_dir;

pub use json::{poem_file_name, JsonCorpus, JsonStats};
pub use text_dir::{TextDirectory, TextDocuments};

/// A named text to be segmented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier, also used as the output file name
    pub id: String,
    /// Raw text
    pub text: String,
}

impl Document {
    /// Create a document
    pub fn new<I: Into<String>, T: Into<String>>(id: I, text: T) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}
