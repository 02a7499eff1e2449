//! Text directory segmentation

use anyhow::{Context, Result};
use clap::Args;
use sikufenci_engine::{DirectorySink, TextDirectory};
use std::path::PathBuf;

use super::{report_summary, start_pipeline, GlobalArgs};
use crate::config::Overrides;
use crate::progress::ProgressReporter;

/// Arguments for segmenting a directory of `.txt` files
#[derive(Debug, Args, Default)]
pub struct SegmentArgs {
    /// Directory of UTF-8 .txt files to segment
    #[arg(value_name = "INPUT_DIR", required = true)]
    pub input_dir: Option<PathBuf>,

    /// Directory the segmented files are written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR", required = true)]
    pub output_dir: Option<PathBuf>,

    /// Maximum chunk length in characters [default: 128]
    #[arg(value_name = "MAX_SEQ_LENGTH")]
    pub max_seq_length: Option<usize>,

    /// Chunks per inference batch [default: 3]
    #[arg(value_name = "EVAL_BATCH_SIZE")]
    pub eval_batch_size: Option<usize>,
}

impl SegmentArgs {
    /// Execute text directory segmentation
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let (Some(input_dir), Some(output_dir)) = (&self.input_dir, &self.output_dir) else {
            anyhow::bail!("INPUT_DIR and OUTPUT_DIR are required");
        };

        let config = global.load_config()?.resolve(Overrides {
            max_seq_length: self.max_seq_length,
            eval_batch_size: self.eval_batch_size,
            model_dir: global.model_dir.clone(),
            engine: global.engine,
            ..Default::default()
        })?;
        // The document cap only applies to JSON input.
        let config = sikufenci_engine::PipelineConfig {
            max_files: None,
            ..config
        };

        let directory = TextDirectory::open(input_dir)
            .with_context(|| format!("Cannot read input directory {}", input_dir.display()))?;
        log::info!(
            "found {} .txt files in {}",
            directory.len(),
            input_dir.display()
        );
        let mut sink = DirectorySink::create(output_dir)?;

        let pipeline = start_pipeline(config, global)?;
        global.say("Processing files...");

        let mut progress = ProgressReporter::new(global.quiet);
        progress.init_files(directory.len() as u64);

        let summary = pipeline
            .run(directory.documents(), &mut sink, &mut progress)
            .context("Segmentation aborted")?;

        report_summary(&summary, output_dir, global);
        Ok(())
    }
}
