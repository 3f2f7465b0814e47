//! Error and warning types.
//!
//! Nothing in the engine itself is fatal: only strict normalization, config
//! loading and snapshot loading return errors. Data problems found while
//! building a view are reported as [`Warning`] values next to the output.

use std::path::PathBuf;

use serde::Serialize;

use crate::fields::MetadataField;
use crate::task::Progress;

/// Strict normalization failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {field} value: {raw:?}")]
pub struct UnrecognizedValueError {
    pub field: MetadataField,
    pub raw: String,
}

/// Alias configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read alias config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse alias config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("alias {alias:?} maps to unknown {field} value {target:?}")]
    InvalidTarget {
        field: MetadataField,
        alias: String,
        target: String,
    },

    #[error("alias {alias:?} would remap a canonical {field} value")]
    CanonicalAlias { field: MetadataField, alias: String },
}

/// Snapshot loading failures.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {} is neither a task array nor an object with a \"tasks\" array", path.display())]
    Shape { path: PathBuf },

    #[error("duplicate task id {0:?} in snapshot")]
    DuplicateId(String),
}

/// A snapshot record that could not be read as a task and was left out.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    /// Position of the record in the snapshot's task array.
    pub index: usize,
    /// The record's `id`, when it had a string one.
    pub id: Option<String>,
    pub error: String,
}

/// Why a subtask could not be attached to its parent.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    /// The referenced id is not in the partition.
    ParentMissing,
    /// The referenced id exists but is not a parent task.
    NotAParent,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedSubtaskWarning {
    pub subtask_id: String,
    pub parent_id: String,
    pub reason: OrphanReason,
}

/// Siblings share an identical explicit sequence code.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InconsistentSequenceWarning {
    pub parent_id: Option<String>,
    pub sequence: String,
    pub task_ids: Vec<String>,
}

/// Non-fatal problem attached to a projected view.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    OrphanedSubtask(OrphanedSubtaskWarning),
    InconsistentSequence(InconsistentSequenceWarning),
    #[serde(rename_all = "camelCase")]
    UnrecognizedValue {
        task_id: String,
        field: MetadataField,
        raw: String,
    },
    #[serde(rename_all = "camelCase")]
    StaleProgress {
        parent_id: String,
        stored: Progress,
        derived: Progress,
    },
}

impl Warning {
    /// Task the warning is attached to. Sequence warnings attach to their
    /// parent.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Warning::OrphanedSubtask(w) => Some(&w.subtask_id),
            Warning::InconsistentSequence(w) => w.parent_id.as_deref(),
            Warning::UnrecognizedValue { task_id, .. } => Some(task_id),
            Warning::StaleProgress { parent_id, .. } => Some(parent_id),
        }
    }

    /// The `kind` tag the warning serializes with.
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::OrphanedSubtask(_) => "orphaned_subtask",
            Warning::InconsistentSequence(_) => "inconsistent_sequence",
            Warning::UnrecognizedValue { .. } => "unrecognized_value",
            Warning::StaleProgress { .. } => "stale_progress",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_value_message() {
        let err = UnrecognizedValueError { field: MetadataField::Status, raw: "maybe".into() };
        assert_eq!(err.to_string(), "unrecognized status value: \"maybe\"");
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let w = Warning::OrphanedSubtask(OrphanedSubtaskWarning {
            subtask_id: "s1".into(),
            parent_id: "p9".into(),
            reason: OrphanReason::ParentMissing,
        });
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "orphaned_subtask");
        assert_eq!(json["subtaskId"], "s1");
        assert_eq!(json["reason"], "parent_missing");
    }

    #[test]
    fn test_kind_matches_serialized_tag() {
        let warnings = [
            Warning::OrphanedSubtask(OrphanedSubtaskWarning {
                subtask_id: "s1".into(),
                parent_id: "p9".into(),
                reason: OrphanReason::NotAParent,
            }),
            Warning::InconsistentSequence(InconsistentSequenceWarning {
                parent_id: None,
                sequence: "03".into(),
                task_ids: vec!["a".into(), "b".into()],
            }),
            Warning::UnrecognizedValue { task_id: "t".into(), field: MetadataField::Priority, raw: "p0".into() },
            Warning::StaleProgress { parent_id: "p".into(), stored: Progress::default(), derived: Progress::default() },
        ];
        for w in &warnings {
            assert_eq!(serde_json::to_value(w).unwrap()["kind"], w.kind());
        }
    }

    #[test]
    fn test_canonical_alias_message() {
        let err = ConfigError::CanonicalAlias { field: MetadataField::Status, alias: "Done".into() };
        assert_eq!(err.to_string(), "alias \"Done\" would remap a canonical status value");
    }
}
