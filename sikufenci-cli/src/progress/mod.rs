//! Progress reporting module

use indicatif::{ProgressBar, ProgressStyle};
use sikufenci_engine::{EngineKind, ProgressObserver, RunSummary};
use std::time::Duration;

/// Progress reporter for document processing
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// Initialize progress bar for `total_files` documents
    pub fn init_files(&mut self, total_files: u64) {
        if self.quiet {
            return;
        }

        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}")
            .map(|style| style.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        let pb = ProgressBar::new(total_files);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    /// Update progress for a completed file
    pub fn file_completed(&self, filename: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("Processed: {filename}"));
            pb.inc(1);
        }
    }

    /// Report a file skipped as empty
    ///
    /// Skipped files do not advance the bar; its length counts the files
    /// that will be written.
    pub fn file_skipped(&self, filename: &str) {
        self.say(&format!("{filename} is empty, skipped"));
    }

    /// Report a file about to be processed
    pub fn file_started(&self, filename: &str) {
        self.say(&format!("Processing: {filename}"));
    }

    /// Print a line on stdout without tearing a visible bar
    fn say(&self, line: &str) {
        if self.quiet {
            return;
        }
        match &self.progress_bar {
            Some(pb) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }

    /// Finish progress reporting
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("Complete");
        }
    }

    /// Whether a progress bar is being drawn
    pub fn is_active(&self) -> bool {
        self.progress_bar.is_some()
    }
}

impl ProgressObserver for ProgressReporter {
    fn run_started(&mut self, engine: EngineKind) {
        log::debug!("progress reporting for {engine} run");
    }

    fn document_started(&mut self, id: &str) {
        self.file_started(id);
    }

    fn document_skipped(&mut self, id: &str) {
        self.file_skipped(id);
    }

    fn document_completed(&mut self, id: &str, _lines: usize) {
        self.file_completed(id);
    }

    fn run_finished(&mut self, _summary: &RunSummary) {
        self.finish();
    }
}
