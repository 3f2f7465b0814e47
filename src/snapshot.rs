//! Flat, id-keyed task snapshots.
//!
//! The snapshot is the arena every view is built from: tasks are stored once,
//! in input order, and relationships are looked up by id when needed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use crate::error::{SkippedRecord, SnapshotError};
use crate::task::Task;

/// Immutable set of tasks with an id index.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    skipped: Vec<SkippedRecord>,
}

impl Snapshot {
    /// Build a snapshot, rejecting duplicate ids.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, SnapshotError> {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, t) in tasks.iter().enumerate() {
            if index.insert(t.id.clone(), i).is_some() {
                return Err(SnapshotError::DuplicateId(t.id.clone()));
            }
        }
        Ok(Snapshot { tasks, index, skipped: Vec::new() })
    }

    /// Load a snapshot from a JSON file holding either an array of tasks or
    /// an object with a `tasks` array.
    ///
    /// Records are read one at a time. A record that does not parse as a
    /// task is logged and kept in [`Snapshot::skipped`] with its index and the
    /// parse error; the rest of the file still loads.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let buf = fs::read_to_string(path).map_err(|source| SnapshotError::Io { path: path.to_path_buf(), source })?;
        let file: Value =
            serde_json::from_str(&buf).map_err(|source| SnapshotError::Parse { path: path.to_path_buf(), source })?;
        let records = match file {
            Value::Array(records) => records,
            Value::Object(mut map) => match map.remove("tasks") {
                Some(Value::Array(records)) => records,
                _ => return Err(SnapshotError::Shape { path: path.to_path_buf() }),
            },
            _ => return Err(SnapshotError::Shape { path: path.to_path_buf() }),
        };

        let mut tasks = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            let id = record.get("id").and_then(Value::as_str).map(str::to_string);
            match serde_json::from_value::<Task>(record) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    warn!("skipping record {index} ({}) in {}: {e}", id.as_deref().unwrap_or("no id"), path.display());
                    skipped.push(SkippedRecord { index, id, error: e.to_string() });
                }
            }
        }
        debug!("loaded {} task(s) from {}, skipped {}", tasks.len(), path.display(), skipped.len());

        let mut snapshot = Snapshot::from_tasks(tasks)?;
        snapshot.skipped = skipped;
        Ok(snapshot)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index.get(id).and_then(|&i| self.tasks.get(i))
    }

    /// Records left out by [`Snapshot::load`] because they were not valid
    /// tasks.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::WorkflowState;
    use std::io::Write;

    fn write_snapshot(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_bare_and_wrapped() {
        let task = r#"{ "id": "a", "title": "A", "workflowState": "backlog" }"#;
        for body in [format!("[{task}]"), format!(r#"{{ "tasks": [{task}] }}"#)] {
            let f = write_snapshot(&body);
            let snap = Snapshot::load(f.path()).unwrap();
            assert_eq!(snap.len(), 1);
            assert_eq!(snap.get("a").map(|t| t.workflow_state), Some(WorkflowState::Backlog));
            assert!(snap.skipped().is_empty());
        }
    }

    #[test]
    fn test_bad_record_is_skipped_not_fatal() {
        let f = write_snapshot(
            r#"[
                { "id": "a", "title": "A", "workflowState": "current" },
                { "id": "b", "title": "B", "workflowState": "current", "createdDate": "2025-05-01T10:00:00Z" },
                { "title": "no id", "workflowState": "current" },
                { "id": "d", "title": "D", "workflowState": "current" }
            ]"#,
        );
        let snap = Snapshot::load(f.path()).unwrap();
        let ids: Vec<_> = snap.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);

        let skipped = snap.skipped();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].index, 1);
        assert_eq!(skipped[0].id.as_deref(), Some("b"));
        assert!(!skipped[0].error.is_empty());
        assert_eq!(skipped[1].index, 2);
        assert_eq!(skipped[1].id, None);
        assert!(skipped[1].error.contains("id"));
    }

    #[test]
    fn test_unexpected_shape_is_an_error() {
        for body in [r#"{ "items": [] }"#, r#"{ "tasks": {} }"#, "42"] {
            let f = write_snapshot(body);
            assert!(matches!(Snapshot::load(f.path()), Err(SnapshotError::Shape { .. })), "body {body}");
        }
        let f = write_snapshot("[ not json");
        assert!(matches!(Snapshot::load(f.path()), Err(SnapshotError::Parse { .. })));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let tasks = vec![Task::new("a", "A", WorkflowState::Current), Task::new("a", "B", WorkflowState::Backlog)];
        assert!(matches!(Snapshot::from_tasks(tasks), Err(SnapshotError::DuplicateId(id)) if id == "a"));
    }
}
