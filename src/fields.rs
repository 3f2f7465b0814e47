//! Canonical enumerations for task metadata.
//!
//! These are the single normalized representations every renderer works with.
//! Raw or legacy strings are mapped onto them by [`crate::normalize`].

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
    Blocked,
    Archived,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Blocked,
        Status::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Blocked => "blocked",
            Status::Archived => "archived",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Todo
    }
}

/// Priority classification. `Medium` is the default and is suppressed in
/// non-default summaries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Highest,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Highest];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Highest => "highest",
        }
    }

    /// True for every priority a summary should surface.
    pub fn is_non_default(self) -> bool {
        self != Priority::Medium
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Task type tag. Anything outside the canonical set is carried through as
/// `Custom` in lookup-key form (e.g. `enhancement`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskType {
    Task,
    Feature,
    Bug,
    Chore,
    Documentation,
    Test,
    Spike,
    Idea,
    Custom(String),
}

impl TaskType {
    pub const CANONICAL: [TaskType; 8] = [
        TaskType::Task,
        TaskType::Feature,
        TaskType::Bug,
        TaskType::Chore,
        TaskType::Documentation,
        TaskType::Test,
        TaskType::Spike,
        TaskType::Idea,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TaskType::Task => "task",
            TaskType::Feature => "feature",
            TaskType::Bug => "bug",
            TaskType::Chore => "chore",
            TaskType::Documentation => "documentation",
            TaskType::Test => "test",
            TaskType::Spike => "spike",
            TaskType::Idea => "idea",
            TaskType::Custom(tag) => tag,
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, TaskType::Custom(_))
    }
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Task
    }
}

impl Serialize for TaskType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Top-level lifecycle bucket. Partitions are disjoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    #[serde(alias = "Backlog")]
    Backlog,
    #[serde(alias = "Current")]
    Current,
    #[serde(alias = "Archive", alias = "archived")]
    Archive,
}

impl WorkflowState {
    /// Fixed display precedence for sections.
    pub const DISPLAY_ORDER: [WorkflowState; 3] =
        [WorkflowState::Current, WorkflowState::Backlog, WorkflowState::Archive];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowState::Backlog => "backlog",
            WorkflowState::Current => "current",
            WorkflowState::Archive => "archive",
        }
    }
}

/// Position of a task in the two-level hierarchy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStructure {
    #[default]
    #[serde(alias = "Simple")]
    Simple,
    #[serde(alias = "Parent")]
    Parent,
    #[serde(alias = "Subtask")]
    Subtask,
}

/// Metadata fields that go through alias normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MetadataField {
    Status,
    Priority,
    Type,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataField::Status => write!(f, "status"),
            MetadataField::Priority => write!(f, "priority"),
            MetadataField::Type => write!(f, "type"),
        }
    }
}
