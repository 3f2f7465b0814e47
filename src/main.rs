//! # tv - task hierarchy inspector
//!
//! Thin command-line front end over the `taskview` engine. Reads a JSON task
//! snapshot, runs the projection and prints canonical JSON for whatever
//! renderer sits downstream.
//!
//! ## Quick Start
//!
//! ```bash
//! # Full projected tree for every non-empty workflow state
//! tv view --input tasks.json
//!
//! # Only the current state, single-line JSON
//! tv view --input tasks.json --state current --compact
//!
//! # Rolled-up progress and cohorts for one parent
//! tv progress --input tasks.json AUTH-01
//!
//! # What does a legacy value map to?
//! tv normalize status "🟡 To Do"
//! tv normalize priority "whenever" --strict
//! ```
//!
//! Extra legacy aliases can be supplied with `--aliases aliases.json`.
//! Logging goes to stderr; use `-v`/`-vv` or `TV_LOG=debug` for more.

use clap::Parser;

mod cli;
mod cmd;

use cli::Cli;
use cmd::*;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_env(env_logger::Env::new().filter("TV_LOG"))
        .init();

    // Completions need no engine setup.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let result = load_normalizer(cli.aliases.as_deref()).and_then(|normalizer| match &cli.command {
        Commands::View { input, state, compact } => cmd_view(&normalizer, input, *state, *compact),
        Commands::Sections { input } => cmd_sections(&normalizer, input),
        Commands::Progress { input, parent } => cmd_progress(&normalizer, input, parent),
        Commands::Warnings { input } => cmd_warnings(&normalizer, input),
        Commands::Normalize { field, value, strict } => cmd_normalize(&normalizer, *field, value, *strict),
        Commands::NextSequence { input, parent } => cmd_next_sequence(input, parent),
        Commands::Completions { .. } => unreachable!("completions handled above"),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
