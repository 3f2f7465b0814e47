use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Task hierarchy inspector.
/// Reads a JSON task snapshot and prints the derived view as JSON.
#[derive(Parser)]
#[command(name = "tv", version, about = "Derived task hierarchy views")]
pub struct Cli {
    /// JSON file with extra legacy aliases for status, priority and type.
    #[arg(long, global = true)]
    pub aliases: Option<PathBuf>,

    /// More log output. May be repeated.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level implied by `-v` / `--quiet`.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
