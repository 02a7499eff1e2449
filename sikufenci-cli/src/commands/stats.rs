//! Stats command implementation

use anyhow::{Context, Result};
use clap::Args;
use sikufenci_engine::{JsonCorpus, JsonStats};
use std::path::PathBuf;

use super::GlobalArgs;
use crate::config::Overrides;

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// JSON file holding an array of records
    #[arg(value_name = "JSON_FILE")]
    pub json_file: PathBuf,

    /// Record field holding the text [default: paragraphs]
    #[arg(long, value_name = "NAME")]
    pub text_field: Option<String>,

    /// Print the statistics as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    /// Execute the stats command
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?.resolve(Overrides {
            text_field: self.text_field.clone(),
            ..Default::default()
        })?;

        let corpus = JsonCorpus::open(&self.json_file)
            .with_context(|| format!("Cannot load {}", self.json_file.display()))?;
        let stats = corpus.stats(&config.text_field);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_stats(&stats);
        }
        Ok(())
    }
}

/// Print corpus statistics in human-readable form
pub(crate) fn print_stats(stats: &JsonStats) {
    println!("JSON file statistics:");
    println!("  - Total items: {}", stats.total_items);
    println!("  - Unique authors: {}", stats.unique_authors);
    println!("  - Total characters: {}", stats.total_chars);
    if !stats.sample_keys.is_empty() {
        println!("  - Sample keys: {}", stats.sample_keys.join(", "));
    }
}
