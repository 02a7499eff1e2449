//! Engine error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the segmentation engine and pipeline
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// Input path does not exist
    #[error("input path does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input directory holds no `.txt` files
    #[error("no .txt files found in {}", .0.display())]
    NoTextFiles(PathBuf),

    /// JSON input could not be parsed or has the wrong shape
    #[error("invalid JSON input in {}: {reason}", path.display())]
    InvalidJson {
        /// The JSON file path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Token and label sequences have different lengths
    #[error("label mismatch: {tokens} tokens but {labels} labels")]
    LabelMismatch {
        /// Number of tokens
        tokens: usize,
        /// Number of labels
        labels: usize,
    },

    /// Predictor returned a different number of results than chunks submitted
    #[error("predictor returned {got} results for a batch of {expected} chunks")]
    BatchSizeMismatch {
        /// Chunks submitted
        expected: usize,
        /// Results returned
        got: usize,
    },

    /// Neural support is not compiled in or the model could not be loaded
    #[error("neural model unavailable: {0}")]
    NeuralUnavailable(String),

    /// Neural inference failed
    #[error("inference failed: {0}")]
    Inference(String),

    /// Processing of one document failed; the run is aborted
    #[error("failed to process document '{document}': {source}")]
    DocumentFailed {
        /// Identifier of the failing document
        document: String,
        /// Underlying failure
        #[source]
        source: Box<EngineError>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

impl EngineError {
    /// Wrap an error with the identifier of the document it happened in
    pub fn in_document(self, document: impl Into<String>) -> Self {
        EngineError::DocumentFailed {
            document: document.into(),
            source: Box::new(self),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::IoError(err.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_failed_display() {
        let err = EngineError::IoError("disk full".to_string()).in_document("a.txt");
        assert_eq!(
            err.to_string(),
            "failed to process document 'a.txt': I/O error: disk full"
        );
    }

    #[test]
    fn test_no_text_files_display() {
        let err = EngineError::NoTextFiles(PathBuf::from("/data/raw"));
        assert_eq!(err.to_string(), "no .txt files found in /data/raw");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::IoError(msg) if msg == "gone"));
    }
}
