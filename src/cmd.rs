//! Command implementations for the CLI interface.
//!
//! Every command reads a snapshot, runs the engine and prints canonical JSON.
//! Turning that output into glyphs or colors is left to whatever consumes it.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use clap_complete::{generate, Shell};
use log::info;
use serde::Serialize;
use serde_json::json;

use taskview::error::{ConfigError, SnapshotError, UnrecognizedValueError};
use taskview::fields::{MetadataField, WorkflowState};
use taskview::hierarchy::build_partition;
use taskview::normalize::Normalizer;
use taskview::progress::resolve_progress;
use taskview::sequence::{group_by_sequence_step, is_parallel_group, next_sequence_code};
use taskview::snapshot::Snapshot;
use taskview::task::Task;
use taskview::view::{ProjectedView, ViewProjector};
use taskview::Warning;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the projected view tree.
    View {
        /// Snapshot file (JSON array of tasks or {"tasks": [...]}).
        #[arg(long)]
        input: PathBuf,
        /// Only this workflow state: backlog | current | archive.
        #[arg(long, value_enum)]
        state: Option<WorkflowState>,
        /// Single-line JSON.
        #[arg(long)]
        compact: bool,
    },

    /// List visible sections with their counts.
    Sections {
        #[arg(long)]
        input: PathBuf,
    },

    /// Show derived progress and cohorts for one parent task.
    Progress {
        #[arg(long)]
        input: PathBuf,
        /// Parent task ID.
        parent: String,
    },

    /// Print only the warnings for a snapshot.
    Warnings {
        #[arg(long)]
        input: PathBuf,
    },

    /// Normalize a single metadata value.
    Normalize {
        /// Field: status | priority | type.
        #[arg(value_enum)]
        field: MetadataField,
        /// Raw value, e.g. "🟡 To Do".
        value: String,
        /// Fail on unrecognized values instead of falling back.
        #[arg(long)]
        strict: bool,
    },

    /// Suggest the sequence code for a new subtask of a parent.
    NextSequence {
        #[arg(long)]
        input: PathBuf,
        /// Parent task ID.
        parent: String,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CmdError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedValueError),

    #[error("task {0:?} not found")]
    TaskNotFound(String),

    #[error("task {0:?} is not a parent task")]
    NotAParent(String),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

/// Build the normalizer, extended from `--aliases` when given.
pub fn load_normalizer(aliases: Option<&Path>) -> Result<Normalizer, CmdError> {
    match aliases {
        Some(path) => Ok(Normalizer::with_config(&taskview::config::AliasConfig::load(path)?)?),
        None => Ok(Normalizer::default()),
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<(), CmdError> {
    let out = if compact { serde_json::to_string(value)? } else { serde_json::to_string_pretty(value)? };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{out}")?;
    Ok(())
}

/// Look up a parent task by id.
fn find_parent<'s>(snapshot: &'s Snapshot, id: &str) -> Result<&'s Task, CmdError> {
    let task = snapshot.get(id).ok_or_else(|| CmdError::TaskNotFound(id.to_string()))?;
    if !task.is_parent() {
        return Err(CmdError::NotAParent(id.to_string()));
    }
    Ok(task)
}

/// Live subtasks of `parent` within its own workflow state.
fn live_subtasks<'s>(snapshot: &'s Snapshot, parent: &Task) -> Vec<&'s Task> {
    let same_state = snapshot.tasks().iter().filter(|t| t.workflow_state == parent.workflow_state);
    build_partition(same_state).children_of(&parent.id).to_vec()
}

/// Print the projected view, optionally limited to one workflow state.
pub fn cmd_view(normalizer: &Normalizer, input: &Path, state: Option<WorkflowState>, compact: bool) -> Result<(), CmdError> {
    let snapshot = Snapshot::load(input)?;
    let projector = ViewProjector::new(normalizer);
    let mut view = projector.project(snapshot.tasks());
    if let Some(state) = state {
        retain_state(&mut view, &snapshot, state);
    }
    info!("{} section(s), {} warning(s)", view.sections.len(), view.warnings.len());
    print_json(&view, compact)
}

/// Keep only the section for `state` and the warnings about its tasks.
/// Warnings that name no task are kept.
fn retain_state(view: &mut ProjectedView, snapshot: &Snapshot, state: WorkflowState) {
    view.sections.retain(|s| s.state == state);
    view.warnings
        .retain(|w| w.task_id().and_then(|id| snapshot.get(id)).map_or(true, |t| t.workflow_state == state));
}

/// Print visible sections with counts and non-default priority markers.
pub fn cmd_sections(normalizer: &Normalizer, input: &Path) -> Result<(), CmdError> {
    let snapshot = Snapshot::load(input)?;
    let view = ViewProjector::new(normalizer).project(snapshot.tasks());
    let sections: Vec<_> = view
        .sections
        .iter()
        .map(|s| json!({ "state": s.state, "counts": s.counts, "priorityMarkers": s.priority_markers() }))
        .collect();
    print_json(&sections, false)
}

/// Print derived progress and sequence cohorts for one parent.
pub fn cmd_progress(normalizer: &Normalizer, input: &Path, parent_id: &str) -> Result<(), CmdError> {
    let snapshot = Snapshot::load(input)?;
    let parent = find_parent(&snapshot, parent_id)?;
    let subtasks = live_subtasks(&snapshot, parent);
    let (progress, stale) = resolve_progress(normalizer, parent, subtasks.iter().copied());

    let mut warnings: Vec<_> = stale.into_iter().collect();
    let mut cohorts = Vec::new();
    for cohort in group_by_sequence_step(&subtasks) {
        warnings.extend(cohort.inconsistencies(Some(parent_id)).into_iter().map(Warning::InconsistentSequence));
        cohorts.push(json!({
            "step": cohort.step,
            "parallel": is_parallel_group(&cohort),
            "members": cohort.member_ids(),
        }));
    }
    print_json(&json!({ "parentId": parent_id, "progress": progress, "cohorts": cohorts, "warnings": warnings }), false)
}

fn warning_counts(warnings: &[Warning]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for w in warnings {
        *counts.entry(w.kind()).or_default() += 1;
    }
    counts
}

/// Print only the warnings, grouped by kind count first, plus any snapshot
/// records that could not be loaded.
pub fn cmd_warnings(normalizer: &Normalizer, input: &Path) -> Result<(), CmdError> {
    let snapshot = Snapshot::load(input)?;
    let view = ViewProjector::new(normalizer).project(snapshot.tasks());
    let counts = warning_counts(&view.warnings);
    print_json(&json!({ "counts": counts, "warnings": view.warnings, "skipped": snapshot.skipped() }), false)
}

/// Normalize one raw value, safe or strict.
pub fn cmd_normalize(normalizer: &Normalizer, field: MetadataField, value: &str, strict: bool) -> Result<(), CmdError> {
    print_json(&normalize_value(normalizer, field, value, strict)?, true)
}

fn normalize_value(
    normalizer: &Normalizer,
    field: MetadataField,
    value: &str,
    strict: bool,
) -> Result<serde_json::Value, CmdError> {
    let out = match (field, strict) {
        (MetadataField::Status, true) => json!({ "value": normalizer.strict_status(value)?.as_str() }),
        (MetadataField::Priority, true) => json!({ "value": normalizer.strict_priority(value)?.as_str() }),
        (MetadataField::Type, true) => json!({ "value": normalizer.strict_type(value)?.as_str() }),
        (MetadataField::Status, false) => {
            let n = normalizer.status(value);
            json!({ "value": n.value.as_str(), "wasUnrecognized": n.was_unrecognized })
        }
        (MetadataField::Priority, false) => {
            let n = normalizer.priority(Some(value));
            json!({ "value": n.value.as_str(), "wasUnrecognized": n.was_unrecognized })
        }
        (MetadataField::Type, false) => {
            let n = normalizer.task_type(value);
            json!({ "value": n.value.as_str(), "canonical": n.value.is_canonical(), "wasUnrecognized": n.was_unrecognized })
        }
    };
    Ok(out)
}

/// Print the next free sequence code under a parent.
pub fn cmd_next_sequence(input: &Path, parent_id: &str) -> Result<(), CmdError> {
    let snapshot = Snapshot::load(input)?;
    let parent = find_parent(&snapshot, parent_id)?;
    let subtasks = live_subtasks(&snapshot, parent);
    print_json(&json!({ "parentId": parent_id, "sequence": next_sequence_code(&subtasks) }), true)
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
