//! End-to-end tests of the segmentation pipeline

use proptest::prelude::*;
use sikufenci_engine::chunker::is_space;
use sikufenci_engine::{
    ChunkManager, Document, EngineError, EngineKind, LabelDecodingSegmenter, LabelPredictor,
    MemorySink, NoopObserver, Pipeline, PipelineConfig, ProgressObserver, Result,
    resolve_engine, RuleBasedSegmenter, RunSummary, SegmentationEngine, TokenLabels,
};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Character-level predictor: a word ends after every second character and
/// after every punctuation mark.
struct PairPredictor {
    releases: Arc<AtomicUsize>,
    fail_on: Option<char>,
}

impl PairPredictor {
    fn new(releases: Arc<AtomicUsize>) -> Self {
        Self {
            releases,
            fail_on: None,
        }
    }
}

impl LabelPredictor for PairPredictor {
    fn predict(&mut self, chunks: &[&str]) -> Result<Vec<TokenLabels>> {
        chunks
            .iter()
            .map(|chunk| {
                if let Some(bad) = self.fail_on {
                    if chunk.contains(bad) {
                        return Err(EngineError::Inference(format!("cannot label {bad}")));
                    }
                }
                let mut tokens = vec!["[CLS]".to_string()];
                let mut labels = vec![0];
                let mut run = 0;
                for ch in chunk.chars() {
                    tokens.push(ch.to_string());
                    run += 1;
                    let boundary = run == 2 || sikufenci_engine::segmenter::is_punctuation(ch);
                    if boundary {
                        run = 0;
                    }
                    labels.push(u32::from(boundary));
                }
                tokens.push("[SEP]".to_string());
                labels.push(0);
                Ok(TokenLabels { tokens, labels })
            })
            .collect()
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn neural_pipeline(config: PipelineConfig, predictor: PairPredictor) -> Pipeline {
    let batch_size = config.eval_batch_size;
    let segmenter = LabelDecodingSegmenter::new(Box::new(predictor), batch_size).unwrap();
    Pipeline::new(config, SegmentationEngine::LabelDecoding(segmenter)).unwrap()
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl ProgressObserver for Recorder {
    fn run_started(&mut self, engine: EngineKind) {
        self.events.push(format!("start {engine}"));
    }

    fn document_skipped(&mut self, id: &str) {
        self.events.push(format!("skip {id}"));
    }

    fn document_completed(&mut self, id: &str, lines: usize) {
        self.events.push(format!("done {id} {lines}"));
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        self.events.push(format!("finish {}", summary.processed));
    }
}

#[test]
fn test_neural_run_segments_and_releases_model() {
    let releases = Arc::new(AtomicUsize::new(0));
    let pipeline = neural_pipeline(
        PipelineConfig::default(),
        PairPredictor::new(releases.clone()),
    );
    assert_eq!(pipeline.engine_kind(), EngineKind::Advanced);

    let documents = vec![Ok(Document::new("a.txt", "天地玄黃，宇宙洪荒。"))];
    let mut sink = MemorySink::new();
    let mut recorder = Recorder::default();
    let summary = pipeline.run(documents, &mut sink, &mut recorder).unwrap();

    assert_eq!(summary.engine, EngineKind::Advanced);
    assert_eq!(sink.get("a.txt"), Some("天地/玄黃/，/宇宙/洪荒/。"));
    assert_eq!(
        recorder.events,
        vec!["start advanced", "done a.txt 1", "finish 1"]
    );
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_model_released_when_run_aborts() {
    let releases = Arc::new(AtomicUsize::new(0));
    let mut predictor = PairPredictor::new(releases.clone());
    predictor.fail_on = Some('壞');
    let pipeline = neural_pipeline(PipelineConfig::default(), predictor);

    let documents = vec![
        Ok(Document::new("a.txt", "好好")),
        Ok(Document::new("b.txt", "壞")),
        Ok(Document::new("c.txt", "好")),
    ];
    let mut sink = MemorySink::new();
    let err = pipeline
        .run(documents, &mut sink, &mut NoopObserver)
        .unwrap_err();

    match err {
        EngineError::DocumentFailed { document, .. } => assert_eq!(document, "b.txt"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sink.documents.len(), 1);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_skipped_documents_are_reported() {
    let pipeline = Pipeline::new(PipelineConfig::default(), SegmentationEngine::rule_based())
        .unwrap();
    let documents = vec![
        Ok(Document::new("blank.txt", "  \n\t\n")),
        Ok(Document::new("a.txt", "學而時習之")),
    ];
    let mut sink = MemorySink::new();
    let mut recorder = Recorder::default();
    pipeline.run(documents, &mut sink, &mut recorder).unwrap();

    assert_eq!(
        recorder.events,
        vec!["start fallback", "skip blank.txt", "done a.txt 1", "finish 1"]
    );
}

#[test]
fn test_lines_are_kept_across_chunks() {
    let config = PipelineConfig::builder()
        .max_seq_length(4)
        .eval_batch_size(2)
        .build()
        .unwrap();
    let releases = Arc::new(AtomicUsize::new(0));
    let mut pipeline = neural_pipeline(config, PairPredictor::new(releases));

    let segmented = pipeline
        .segment_text("床前明月光\n\n疑是地上霜")
        .unwrap()
        .unwrap();

    // 床前明月 | 光 and 疑是地上 | 霜: the single-character tails are runs
    // without a boundary label and are still emitted.
    assert_eq!(segmented.body, "床前/明月/光\n疑是/地上/霜");
    assert_eq!(segmented.lines, 2);
    assert_eq!(segmented.chunks, 4);
}

fn segment_with_batch_size(text: &str, batch_size: usize) -> String {
    let config = PipelineConfig::builder()
        .max_seq_length(5)
        .eval_batch_size(batch_size)
        .build()
        .unwrap();
    let releases = Arc::new(AtomicUsize::new(0));
    let mut pipeline = neural_pipeline(config, PairPredictor::new(releases));
    pipeline
        .segment_text(text)
        .unwrap()
        .map(|segmented| segmented.body)
        .unwrap_or_default()
}

#[test]
fn test_batch_size_does_not_change_output() {
    let text = "子曰：學而時習之，不亦說乎？\n有朋自遠方來，不亦樂乎？\n人不知而不慍，不亦君子乎？";
    let expected = segment_with_batch_size(text, 1);
    for batch_size in [2, 3, 7, 64] {
        assert_eq!(segment_with_batch_size(text, batch_size), expected);
    }
}

fn cjk_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => prop::char::range('一', '龥'),
            1 => prop::sample::select(vec!['，', '。', '！', '？', '「', '」']),
            1 => prop::sample::select(vec![' ', '\n', '\t']),
        ],
        0..200,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_chunks_rebuild_trimmed_lines(text in cjk_text(), max_len in 1usize..20) {
        let chunker = ChunkManager::new(max_len).unwrap();
        let chunks = chunker.chunk_text(&text);

        let expected: Vec<&str> = text
            .split('\n')
            .map(|line| line.trim_matches(is_space))
            .filter(|line| !line.is_empty())
            .collect();

        let mut rebuilt: Vec<String> = Vec::new();
        for chunk in &chunks {
            prop_assert!(!chunk.text.is_empty());
            prop_assert!(chunk.text.chars().count() <= max_len);
            if chunk.line == rebuilt.len() {
                rebuilt.push(String::new());
            }
            prop_assert_eq!(chunk.line + 1, rebuilt.len());
            rebuilt[chunk.line].push_str(chunk.text);
        }

        prop_assert_eq!(rebuilt, expected);
    }

    #[test]
    fn prop_rule_based_keeps_every_visible_char(text in cjk_text()) {
        let segmenter = RuleBasedSegmenter::new();
        let segments = segmenter.tokenize(&text);

        let visible: String = text.chars().filter(|&ch| !is_space(ch)).collect();
        prop_assert_eq!(segments.concat(), visible);

        for segment in &segments {
            prop_assert!(!segment.is_empty());
            let punctuation = segment
                .chars()
                .filter(|&ch| sikufenci_engine::segmenter::is_punctuation(ch))
                .count();
            if punctuation > 0 {
                prop_assert_eq!(segment.chars().count(), 1);
            }
        }
    }

    #[test]
    fn prop_failed_initialisation_segments_whole_run_rule_based(
        texts in prop::collection::vec(cjk_text(), 1..5)
    ) {
        let calls = Cell::new(0);
        let selection = resolve_engine(true, 3, || {
            calls.set(calls.get() + 1);
            Err(EngineError::NeuralUnavailable("no weights".to_string()))
        });
        prop_assert_eq!(calls.get(), 1);
        prop_assert!(selection.fallback_reason.is_some());

        let documents: Vec<Result<Document>> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Ok(Document::new(format!("{i}.txt"), text.as_str())))
            .collect();
        let pipeline = Pipeline::new(PipelineConfig::default(), selection.engine).unwrap();
        let mut sink = MemorySink::new();
        let summary = pipeline.run(documents, &mut sink, &mut NoopObserver).unwrap();

        prop_assert_eq!(summary.engine, EngineKind::Fallback);
        prop_assert_eq!(summary.processed + summary.skipped_empty, texts.len());

        let mut reference = Pipeline::new(PipelineConfig::default(), SegmentationEngine::rule_based())
            .unwrap();
        for (i, text) in texts.iter().enumerate() {
            let expected = reference.segment_text(text).unwrap().map(|segmented| segmented.body);
            prop_assert_eq!(sink.get(&format!("{i}.txt")), expected.as_deref());
        }
    }
}
