//! JSON array of text records
//!
//! Each record is an object carrying its text in a configurable field
//! (`paragraphs` by default) and optionally `author` and `title`. Records
//! become documents named `poem_{n:05}_{author}_{title}.txt`, where `n` is
//! the 1-based position of the record in the array.

use super::Document;
use crate::error::{EngineError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const UNKNOWN_AUTHOR: &str = "unknown";
const UNTITLED: &str = "untitled";

/// Output file name for the record at 0-based `index`
///
/// `/`, `\` and `:` are replaced by `_` so the name stays a single path
/// component.
pub fn poem_file_name(index: usize, author: &str, title: &str) -> String {
    format!("poem_{:05}_{}_{}.txt", index + 1, author, title).replace(['/', '\\', ':'], "_")
}

/// Summary of a JSON corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonStats {
    /// Number of records
    pub total_items: usize,
    /// Number of distinct authors
    pub unique_authors: usize,
    /// Characters of text over all records carrying the text field
    pub total_chars: usize,
    /// Keys of the first record
    pub sample_keys: Vec<String>,
}

/// A parsed JSON array of records
#[derive(Debug, Clone)]
pub struct JsonCorpus {
    path: PathBuf,
    records: Vec<Value>,
}

impl JsonCorpus {
    /// Read and parse a JSON file
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(EngineError::InputNotFound(path));
        }
        let raw = fs::read_to_string(&path).map_err(|e| EngineError::InvalidJson {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &raw)
    }

    /// Parse JSON text; `path` is only used in error messages
    pub fn parse<P: Into<PathBuf>>(path: P, raw: &str) -> Result<Self> {
        let path = path.into();
        let value: Value = serde_json::from_str(raw).map_err(|e| EngineError::InvalidJson {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        match value {
            Value::Array(records) => Ok(Self { path, records }),
            _ => Err(EngineError::InvalidJson {
                path,
                reason: "top-level value must be an array".to_string(),
            }),
        }
    }

    /// The source file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Documents of the records that carry `text_field`, in array order
    pub fn documents<'a>(&'a self, text_field: &'a str) -> impl Iterator<Item = Document> + 'a {
        self.records
            .iter()
            .enumerate()
            .filter_map(move |(index, record)| {
                let text = record.get(text_field).map(text_of)?;
                let author = field_or(record, "author", UNKNOWN_AUTHOR);
                let title = field_or(record, "title", UNTITLED);
                Some(Document::new(poem_file_name(index, &author, &title), text))
            })
    }

    /// Corpus statistics
    pub fn stats(&self, text_field: &str) -> JsonStats {
        let authors: BTreeSet<String> = self
            .records
            .iter()
            .filter_map(|record| record.get("author").map(scalar_text))
            .collect();

        let total_chars = self
            .records
            .iter()
            .filter_map(|record| record.get(text_field))
            .map(|text| text_of(text).chars().count())
            .sum();

        let sample_keys = self
            .records
            .first()
            .and_then(Value::as_object)
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();

        JsonStats {
            total_items: self.records.len(),
            unique_authors: authors.len(),
            total_chars,
            sample_keys,
        }
    }
}

/// Text of a record field: strings as-is, arrays joined line by line
fn text_of(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join("\n"),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_or(record: &Value, key: &str, default: &str) -> String {
    record
        .get(key)
        .map(scalar_text)
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"[
        {"author": "李白", "title": "靜夜思", "paragraphs": ["床前明月光，疑是地上霜。", "舉頭望明月，低頭思故鄉。"]},
        {"author": "A/B", "title": "C:D", "paragraphs": "春眠不覺曉"},
        {"author": "李白", "note": "no text here"},
        {"paragraphs": "處處聞啼鳥"}
    ]"#;

    #[test]
    fn test_file_name_is_sanitized() {
        assert_eq!(poem_file_name(0, "A/B", "C:D"), "poem_00001_A_B_C_D.txt");
        assert_eq!(poem_file_name(41, "x\\y", "t"), "poem_00042_x_y_t.txt");
    }

    #[test]
    fn test_documents_skip_records_without_text() {
        let corpus = JsonCorpus::parse("sample.json", SAMPLE).unwrap();
        let docs: Vec<Document> = corpus.documents("paragraphs").collect();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].id, "poem_00001_李白_靜夜思.txt");
        assert_eq!(
            docs[0].text,
            "床前明月光，疑是地上霜。\n舉頭望明月，低頭思故鄉。"
        );
        assert_eq!(docs[1].id, "poem_00002_A_B_C_D.txt");
        assert_eq!(docs[1].text, "春眠不覺曉");
        assert_eq!(docs[2].id, "poem_00004_unknown_untitled.txt");
    }

    #[test]
    fn test_custom_text_field() {
        let corpus = JsonCorpus::parse("sample.json", SAMPLE).unwrap();
        let docs: Vec<Document> = corpus.documents("note").collect();
        assert_eq!(docs, vec![Document::new("poem_00003_李白_untitled.txt", "no text here")]);
    }

    #[test]
    fn test_stats() {
        let corpus = JsonCorpus::parse("sample.json", SAMPLE).unwrap();
        let stats = corpus.stats("paragraphs");

        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.unique_authors, 2);
        assert_eq!(stats.total_chars, 25 + 5 + 5);
        assert_eq!(stats.sample_keys, vec!["author", "paragraphs", "title"]);
    }

    #[test]
    fn test_non_array_rejected() {
        let err = JsonCorpus::parse("x.json", r#"{"paragraphs": "x"}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidJson { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = JsonCorpus::parse("x.json", "[{").unwrap_err();
        assert!(err.to_string().contains("x.json"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = JsonCorpus::open("/nonexistent/poems.json").unwrap_err();
        assert!(matches!(err, EngineError::InputNotFound(_)));
    }

    #[test]
    fn test_open_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poems.json");
        fs::write(&path, SAMPLE).unwrap();

        let corpus = JsonCorpus::open(&path).unwrap();
        assert_eq!(corpus.len(), 4);
        assert_eq!(corpus.path(), path.as_path());
    }
}
