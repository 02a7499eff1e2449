//! JSON array segmentation

use anyhow::{Context, Result};
use clap::Args;
use sikufenci_engine::{DirectorySink, JsonCorpus};
use std::path::PathBuf;

use super::{report_summary, start_pipeline, stats::print_stats, GlobalArgs};
use crate::config::Overrides;
use crate::progress::ProgressReporter;

/// Arguments for the json command
#[derive(Debug, Args)]
pub struct JsonArgs {
    /// JSON file holding an array of records
    #[arg(value_name = "JSON_FILE")]
    pub json_file: PathBuf,

    /// Directory the segmented files are written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Maximum chunk length in characters [default: 128]
    #[arg(value_name = "MAX_SEQ_LENGTH")]
    pub max_seq_length: Option<usize>,

    /// Chunks per inference batch [default: 3]
    #[arg(value_name = "EVAL_BATCH_SIZE")]
    pub eval_batch_size: Option<usize>,

    /// Stop after this many documents have been written
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Record field holding the text [default: paragraphs]
    #[arg(long, value_name = "NAME")]
    pub text_field: Option<String>,
}

impl JsonArgs {
    /// Execute the json command
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?.resolve(Overrides {
            max_seq_length: self.max_seq_length,
            eval_batch_size: self.eval_batch_size,
            text_field: self.text_field.clone(),
            max_files: self.max_files,
            model_dir: global.model_dir.clone(),
            engine: global.engine,
        })?;

        let corpus = JsonCorpus::open(&self.json_file)
            .with_context(|| format!("Cannot load {}", self.json_file.display()))?;
        if !global.quiet {
            print_stats(&corpus.stats(&config.text_field));
        }

        let mut sink = DirectorySink::create(&self.output_dir)?;
        let text_field = config.text_field.clone();
        let total = corpus.documents(&text_field).count();
        // Upper bound on written documents; skips never advance the bar.
        let expected = config.max_files.map_or(total, |limit| limit.min(total));

        let pipeline = start_pipeline(config, global)?;
        global.say("Processing JSON records...");

        let mut progress = ProgressReporter::new(global.quiet);
        progress.init_files(expected as u64);

        let summary = pipeline
            .run(corpus.documents(&text_field).map(Ok), &mut sink, &mut progress)
            .context("Segmentation aborted")?;

        report_summary(&summary, &self.output_dir, global);
        Ok(())
    }
}
