//! Result sinks

use crate::error::{EngineError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Destination for result documents
pub trait ResultSink {
    /// Store the body of the result document called `name`
    fn write(&mut self, name: &str, body: &str) -> Result<()>;
}

/// Writes each result document to a file in one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Use `root` as the result directory, creating it if needed
    pub fn create<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            EngineError::IoError(format!("failed to create {}: {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    /// The result directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the result document called `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl ResultSink for DirectorySink {
    fn write(&mut self, name: &str, body: &str) -> Result<()> {
        let path = self.path_for(name);
        fs::write(&path, body)
            .map_err(|e| EngineError::IoError(format!("failed to write {}: {e}", path.display())))
    }
}

/// Keeps result documents in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Documents written so far, in order
    pub documents: Vec<(String, String)>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Body of the document called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.documents
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body.as_str())
    }
}

impl ResultSink for MemorySink {
    fn write(&mut self, name: &str, body: &str) -> Result<()> {
        self.documents.push((name.to_string(), body.to_string()));
        Ok(())
    }
}
