//! Label-decoding tokenizer
//!
//! A [`LabelPredictor`] turns each chunk into sub-word tokens plus one binary
//! label per token, `1` meaning "a word ends here". Decoding walks tokens and
//! labels together, drops the reserved marker tokens, strips the `##`
//! continuation prefix and cuts a new segment after every boundary label.

use super::{EngineKind, Segmenter};
use crate::error::{EngineError, Result};
use std::fmt;

/// Sequence start marker
pub const CLS_TOKEN: &str = "[CLS]";
/// Sequence end marker
pub const SEP_TOKEN: &str = "[SEP]";
/// Padding marker
pub const PAD_TOKEN: &str = "[PAD]";
/// Prefix of a non-initial sub-word fragment
pub const CONTINUATION_PREFIX: &str = "##";
/// Label marking the end of a word
pub const BOUNDARY_LABEL: u32 = 1;

/// Tokens of one chunk with their predicted labels
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenLabels {
    /// Sub-word tokens, including the reserved markers
    pub tokens: Vec<String>,
    /// One label per token; labels of marker tokens are ignored
    pub labels: Vec<u32>,
}

impl TokenLabels {
    /// Pair tokens with labels
    pub fn new<S: Into<String>>(tokens: impl IntoIterator<Item = S>, labels: Vec<u32>) -> Self {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            labels,
        }
    }

    /// Decode into segments, see [`decode_labels`]
    pub fn decode(&self) -> Result<Vec<String>> {
        decode_labels(&self.tokens, &self.labels)
    }
}

fn is_marker(token: &str) -> bool {
    matches!(token, CLS_TOKEN | SEP_TOKEN | PAD_TOKEN)
}

/// Decode per-token boundary labels into segments
///
/// The run after the last boundary label is flushed as a final segment, so
/// no token text is ever dropped.
pub fn decode_labels<S: AsRef<str>>(tokens: &[S], labels: &[u32]) -> Result<Vec<String>> {
    if tokens.len() != labels.len() {
        return Err(EngineError::LabelMismatch {
            tokens: tokens.len(),
            labels: labels.len(),
        });
    }

    let mut segments = Vec::new();
    let mut pending = String::new();

    for (token, &label) in tokens.iter().zip(labels) {
        let token = token.as_ref();
        if is_marker(token) {
            continue;
        }

        pending.push_str(token.strip_prefix(CONTINUATION_PREFIX).unwrap_or(token));

        if label == BOUNDARY_LABEL && !pending.is_empty() {
            segments.push(std::mem::take(&mut pending));
        }
    }

    if !pending.is_empty() {
        segments.push(pending);
    }

    Ok(segments)
}

/// Produces tokens and boundary labels for batches of chunks
pub trait LabelPredictor {
    /// Predict labels for every chunk of the batch, in order
    fn predict(&mut self, chunks: &[&str]) -> Result<Vec<TokenLabels>>;

    /// Free the model. Called once when the owning engine is dropped.
    fn release(&mut self) {}

    /// Human-readable name for logs
    fn name(&self) -> &str {
        "label predictor"
    }
}

/// Segmenter that batches chunks through a [`LabelPredictor`]
pub struct LabelDecodingSegmenter {
    predictor: Box<dyn LabelPredictor>,
    batch_size: usize,
}

impl LabelDecodingSegmenter {
    /// Wrap a predictor, submitting at most `batch_size` chunks per call
    pub fn new(predictor: Box<dyn LabelPredictor>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(EngineError::ConfigError(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            predictor,
            batch_size,
        })
    }

    /// Chunks per predictor call
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl fmt::Debug for LabelDecodingSegmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelDecodingSegmenter")
            .field("predictor", &self.predictor.name())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Segmenter for LabelDecodingSegmenter {
    fn segment(&mut self, chunk: &str) -> Result<Vec<String>> {
        Ok(self.segment_all(&[chunk])?.pop().unwrap_or_default())
    }

    fn segment_all(&mut self, chunks: &[&str]) -> Result<Vec<Vec<String>>> {
        let mut results = Vec::with_capacity(chunks.len());

        for (index, batch) in chunks.chunks(self.batch_size).enumerate() {
            log::trace!("predicting batch {} ({} chunks)", index, batch.len());
            let predictions = self.predictor.predict(batch)?;
            if predictions.len() != batch.len() {
                return Err(EngineError::BatchSizeMismatch {
                    expected: batch.len(),
                    got: predictions.len(),
                });
            }
            for prediction in &predictions {
                results.push(prediction.decode()?);
            }
        }

        Ok(results)
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Advanced
    }
}

impl Drop for LabelDecodingSegmenter {
    fn drop(&mut self) {
        log::debug!("releasing {}", self.predictor.name());
        self.predictor.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One token per character, boundary after every second character
    struct PairPredictor;

    impl LabelPredictor for PairPredictor {
        fn predict(&mut self, chunks: &[&str]) -> Result<Vec<TokenLabels>> {
            Ok(chunks
                .iter()
                .map(|chunk| {
                    let mut tokens = vec![CLS_TOKEN.to_string()];
                    let mut labels = vec![0];
                    for (i, ch) in chunk.chars().enumerate() {
                        tokens.push(ch.to_string());
                        labels.push(if i % 2 == 1 { 1 } else { 0 });
                    }
                    tokens.push(SEP_TOKEN.to_string());
                    labels.push(0);
                    TokenLabels { tokens, labels }
                })
                .collect())
        }
    }

    #[test]
    fn test_decode_boundary_example() {
        let segments =
            decode_labels(&["[CLS]", "你", "好", "##界", "[SEP]"], &[0, 0, 1, 1, 0]).unwrap();
        assert_eq!(segments, vec!["你好", "界"]);
    }

    #[test]
    fn test_decode_marker_labels_ignored() {
        let segments =
            decode_labels(&["[CLS]", "天", "地", "[SEP]", "[PAD]"], &[1, 1, 1, 1, 1]).unwrap();
        assert_eq!(segments, vec!["天", "地"]);
    }

    #[test]
    fn test_decode_trailing_run_is_flushed() {
        let segments = decode_labels(
            &["[CLS]", "春", "眠", "不", "覺", "[SEP]", "[PAD]", "[PAD]"],
            &[0, 0, 1, 0, 0, 0, 0, 0],
        )
        .unwrap();
        assert_eq!(segments, vec!["春眠", "不覺"]);
    }

    #[test]
    fn test_decode_subword_merging() {
        let segments =
            decode_labels(&["[CLS]", "un", "##der", "##stand", "[SEP]"], &[0, 0, 0, 1, 0])
                .unwrap();
        assert_eq!(segments, vec!["understand"]);
    }

    #[test]
    fn test_decode_empty_and_markers_only() {
        let empty: [&str; 0] = [];
        assert!(decode_labels(&empty, &[]).unwrap().is_empty());
        assert!(decode_labels(&["[CLS]", "[SEP]"], &[1, 1]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_length_mismatch() {
        let err = decode_labels(&["[CLS]", "你"], &[0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::LabelMismatch {
                tokens: 2,
                labels: 1
            }
        ));
    }

    #[test]
    fn test_segmenter_batches_in_order() {
        let mut segmenter = LabelDecodingSegmenter::new(Box::new(PairPredictor), 2).unwrap();
        let segments = segmenter
            .segment_all(&["天地玄黃", "宇宙洪荒", "日月盈昃"])
            .unwrap();
        assert_eq!(
            segments,
            vec![
                vec!["天地", "玄黃"],
                vec!["宇宙", "洪荒"],
                vec!["日月", "盈昃"],
            ]
        );
        assert_eq!(segmenter.kind(), EngineKind::Advanced);
    }

    #[test]
    fn test_single_chunk_segment() {
        let mut segmenter = LabelDecodingSegmenter::new(Box::new(PairPredictor), 3).unwrap();
        assert_eq!(segmenter.segment("辰宿列").unwrap(), vec!["辰宿", "列"]);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(LabelDecodingSegmenter::new(Box::new(PairPredictor), 0).is_err());
    }

    #[test]
    fn test_short_prediction_batch_is_an_error() {
        struct Forgetful;
        impl LabelPredictor for Forgetful {
            fn predict(&mut self, _chunks: &[&str]) -> Result<Vec<TokenLabels>> {
                Ok(Vec::new())
            }
        }

        let mut segmenter = LabelDecodingSegmenter::new(Box::new(Forgetful), 4).unwrap();
        let err = segmenter.segment_all(&["甲", "乙"]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::BatchSizeMismatch {
                expected: 2,
                got: 0
            }
        ));
    }
}
