//! Export command implementation

use anyhow::{Context, Result};
use clap::Args;
use sikufenci_engine::{DirectorySink, JsonCorpus, ResultSink};
use std::path::PathBuf;

use super::GlobalArgs;
use crate::config::Overrides;

/// Arguments for the export command
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// JSON file holding an array of records
    #[arg(value_name = "JSON_FILE")]
    pub json_file: PathBuf,

    /// Directory the .txt files are written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Stop after this many files have been written
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Record field holding the text [default: paragraphs]
    #[arg(long, value_name = "NAME")]
    pub text_field: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?.resolve(Overrides {
            text_field: self.text_field.clone(),
            max_files: self.max_files,
            ..Default::default()
        })?;

        let corpus = JsonCorpus::open(&self.json_file)
            .with_context(|| format!("Cannot load {}", self.json_file.display()))?;
        let mut sink = DirectorySink::create(&self.output_dir)?;

        let limit = config.max_files.unwrap_or(usize::MAX);
        let mut written = 0;
        for document in corpus.documents(&config.text_field).take(limit) {
            sink.write(&document.id, &document.text)?;
            log::debug!("exported {}", document.id);
            written += 1;
        }

        global.say(format!(
            "✓ Exported {written} files to {}",
            self.output_dir.display()
        ));
        Ok(())
    }
}
