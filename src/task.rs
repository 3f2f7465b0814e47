//! Task record as supplied by the data source.
//!
//! Metadata (`status`, `priority`, `type`) is kept exactly as it arrived so
//! that normalization can tell canonical values from legacy or unknown ones.
//! Parent and subtask links are plain IDs, resolved at view-build time.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::{TaskStructure, WorkflowState};

/// A single work item in one workflow state.
///
/// Parent tasks use the same record with `task_structure = parent`; their
/// `subtask_ids` and `progress` are whatever the store had cached and are
/// never treated as authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
    pub workflow_state: WorkflowState,
    #[serde(default)]
    pub task_structure: TaskStructure,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub sequence: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub created_date: Option<NaiveDate>,
    #[serde(default)]
    pub updated_date: Option<NaiveDate>,
    #[serde(default)]
    pub archived_date: Option<NaiveDate>,
    #[serde(default)]
    pub content: BTreeMap<String, String>,
    #[serde(default)]
    pub subtask_ids: Vec<String>,
    #[serde(default)]
    pub progress: Option<Progress>,
}

impl Task {
    /// Minimal record with the given identity; everything else defaulted.
    pub fn new(id: impl Into<String>, title: impl Into<String>, workflow_state: WorkflowState) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            task_type: String::new(),
            status: String::new(),
            priority: None,
            workflow_state,
            task_structure: TaskStructure::Simple,
            parent_id: None,
            sequence: None,
            tags: Vec::new(),
            assignee: None,
            area: None,
            created_date: None,
            updated_date: None,
            archived_date: None,
            content: BTreeMap::new(),
            subtask_ids: Vec::new(),
            progress: None,
        }
    }

    /// Parent reference, ignoring blank strings.
    pub fn parent_ref(&self) -> Option<&str> {
        self.parent_id.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// Sequence code, ignoring blank strings.
    pub fn sequence_code(&self) -> Option<&str> {
        self.sequence.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_parent(&self) -> bool {
        self.task_structure == TaskStructure::Parent
    }
}

/// Rolled-up completion figures for a set of subtasks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

/// Normalize a tag string by trimming, lowercasing, and replacing spaces with hyphens.
pub fn normalise_tag(s: &str) -> String {
    s.trim().to_lowercase().replace(' ', "-")
}

/// Normalize, sort and dedupe a tag list, dropping empty entries.
pub fn normalise_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tags
        .iter()
        .map(|t| normalise_tag(t))
        .filter(|t| !t.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
