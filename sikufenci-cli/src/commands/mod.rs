//! CLI command implementations

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sikufenci_engine::{EngineKind, Pipeline, PipelineConfig, RunSummary};
use std::path::{Path, PathBuf};

use crate::config::{CliConfig, EngineChoice};

pub mod export;
pub mod json;
pub mod segment;
pub mod stats;

/// Classical Chinese word segmentation
///
/// Without a subcommand, segments every `.txt` file of INPUT_DIR and writes
/// the results to OUTPUT_DIR.
#[derive(Debug, Parser)]
#[command(name = "sikufenci", version, about, long_about = None)]
#[command(subcommand_negates_reqs = true)]
pub struct Cli {
    /// JSON and corpus commands
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Text directory segmentation
    #[command(flatten)]
    pub segment: segment::SegmentArgs,

    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Segment the records of a JSON array file
    Json(json::JsonArgs),

    /// Write the raw text of each JSON record to its own .txt file
    Export(export::ExportArgs),

    /// Print statistics about a JSON array file
    Stats(stats::StatsArgs),
}

/// Options accepted before or after any subcommand
#[derive(Debug, Args, Default)]
pub struct GlobalArgs {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Model directory for the neural engine
    #[arg(long, value_name = "DIR", env = "SIKUFENCI_MODEL_DIR", global = true)]
    pub model_dir: Option<PathBuf>,

    /// Segmentation engine
    #[arg(long, value_enum, global = true)]
    pub engine: Option<EngineChoice>,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        self.global.init_logging();
        log::debug!("Arguments: {:?}", self);

        match &self.command {
            Some(Commands::Json(args)) => args.execute(&self.global),
            Some(Commands::Export(args)) => args.execute(&self.global),
            Some(Commands::Stats(args)) => args.execute(&self.global),
            None => self.segment.execute(&self.global),
        }
    }
}

impl GlobalArgs {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // A second initialisation in the same process is harmless.
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }
    }

    /// The configuration file contents, or defaults without `--config`
    pub fn load_config(&self) -> Result<CliConfig> {
        match &self.config {
            Some(path) => CliConfig::load(path),
            None => Ok(CliConfig::default()),
        }
    }

    /// Print a user-facing message unless `--quiet` was given
    pub fn say(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", message.as_ref());
        }
    }
}

/// Select the engine for a run and announce it
pub(crate) fn start_pipeline(config: PipelineConfig, global: &GlobalArgs) -> Result<Pipeline> {
    global.say("Initializing segmentation system...");
    let pipeline = Pipeline::from_config(config)?;

    if let Some(reason) = pipeline.fallback_reason() {
        global.say(format!("Advanced model initialization failed: {reason}"));
        global.say("Switching to rule-based segmenter");
    }
    match pipeline.engine_kind() {
        EngineKind::Advanced => global.say("Using advanced segmenter"),
        EngineKind::Fallback => global.say("Using rule-based segmenter"),
    }
    Ok(pipeline)
}

/// Print the closing summary of a run
pub(crate) fn report_summary(summary: &RunSummary, output_dir: &Path, global: &GlobalArgs) {
    if summary.skipped_empty > 0 {
        global.say(format!("Skipped {} empty files", summary.skipped_empty));
    }
    global.say(format!(
        "✓ Segmentation complete: {} files processed",
        summary.processed
    ));
    global.say(format!("Results saved to: {}", output_dir.display()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sikufenci").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_form() {
        let cli = parse(&["in", "out", "64", "4"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.segment.input_dir, Some(PathBuf::from("in")));
        assert_eq!(cli.segment.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.segment.max_seq_length, Some(64));
        assert_eq!(cli.segment.eval_batch_size, Some(4));
    }

    #[test]
    fn test_default_form_requires_two_paths() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["in"]).is_err());
    }

    #[test]
    fn test_non_numeric_length_rejected() {
        assert!(parse(&["in", "out", "long"]).is_err());
    }

    #[test]
    fn test_json_subcommand() {
        let cli = parse(&[
            "json",
            "poems.json",
            "out",
            "--max-files",
            "5",
            "--text-field",
            "content",
            "--engine",
            "rule",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Json(args)) => {
                assert_eq!(args.json_file, PathBuf::from("poems.json"));
                assert_eq!(args.max_files, Some(5));
                assert_eq!(args.text_field.as_deref(), Some("content"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.global.engine, Some(EngineChoice::Rule));
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = parse(&["-q", "-vv", "stats", "poems.json"]).unwrap();
        assert!(cli.global.quiet);
        assert_eq!(cli.global.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Stats(_))));
    }

    #[test]
    fn test_unknown_engine_rejected() {
        assert!(parse(&["in", "out", "--engine", "fast"]).is_err());
    }
}
