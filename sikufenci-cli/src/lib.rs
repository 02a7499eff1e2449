//! Sikufenci CLI library
//!
//! This library provides the command-line interface for the sikufenci
//! classical Chinese word segmentation system.

pub mod commands;
pub mod config;
pub mod error;
pub mod progress;

pub use commands::Cli;
pub use error::{CliError, CliResult};
