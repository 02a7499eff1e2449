//! Directory of UTF-8 `.txt` files

use super::Document;
use crate::error::{EngineError, Result};
use glob::{glob, Pattern};
use std::fs;
use std::path::{Path, PathBuf};

/// The `.txt` files of one directory, in sorted order
#[derive(Debug, Clone)]
pub struct TextDirectory {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl TextDirectory {
    /// List the `.txt` files of `dir`
    ///
    /// Fails when the directory does not exist or holds no `.txt` file.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let root = dir.into();
        if !root.exists() {
            return Err(EngineError::InputNotFound(root));
        }

        let pattern = format!(
            "{}/*.txt",
            Pattern::escape(&root.to_string_lossy()).trim_end_matches('/')
        );
        let paths = glob(&pattern)
            .map_err(|e| EngineError::ConfigError(format!("invalid input path: {e}")))?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| EngineError::IoError(e.to_string()))?;
            if path.is_file() {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(EngineError::NoTextFiles(root));
        }

        files.sort();
        files.dedup();

        Ok(Self { root, files })
    }

    /// The directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The files found, sorted
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of files found
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file was found (never true for an opened directory)
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Read the files lazily, one document per file
    pub fn documents(&self) -> TextDocuments<'_> {
        TextDocuments {
            files: self.files.iter(),
        }
    }
}

/// Iterator over the documents of a [`TextDirectory`]
///
/// Files that are not valid UTF-8 are skipped with a warning. Any other read
/// failure is returned as an error.
#[derive(Debug, Clone)]
pub struct TextDocuments<'a> {
    files: std::slice::Iter<'a, PathBuf>,
}

impl Iterator for TextDocuments<'_> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        for path in self.files.by_ref() {
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    return Some(Err(EngineError::IoError(format!(
                        "failed to read {}: {e}",
                        path.display()
                    ))))
                }
            };

            match String::from_utf8(bytes) {
                Ok(text) => return Some(Ok(Document::new(file_name(path), text))),
                Err(_) => {
                    log::warn!("{} is not valid UTF-8, skipping", path.display());
                    continue;
                }
            }
        }
        None
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
