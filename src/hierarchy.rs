//! Parent / standalone / subtask partitioning of one workflow state.
//!
//! Links are resolved purely by id lookup on the flat task list; nothing
//! holds a reference from one task to another.

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::{OrphanReason, OrphanedSubtaskWarning};
use crate::fields::WorkflowState;
use crate::task::Task;

/// A subtask whose parent could not be resolved in the partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orphan<'a> {
    pub task: &'a Task,
    pub reason: OrphanReason,
}

impl Orphan<'_> {
    pub fn warning(&self) -> OrphanedSubtaskWarning {
        OrphanedSubtaskWarning {
            subtask_id: self.task.id.clone(),
            parent_id: self.task.parent_ref().unwrap_or_default().to_string(),
            reason: self.reason,
        }
    }
}

/// Tasks of one workflow state split by hierarchy role.
///
/// `parents`, `standalone` and `subtasks` together hold every input task
/// exactly once. `orphans` is the subset of `subtasks` that could not be
/// attached, in input order.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    pub parents: Vec<&'a Task>,
    pub standalone: Vec<&'a Task>,
    pub subtasks: Vec<&'a Task>,
    pub orphans: Vec<Orphan<'a>>,
    children: HashMap<&'a str, Vec<&'a Task>>,
}

impl<'a> Partition<'a> {
    /// Subtasks attached to `parent_id`, in input order.
    pub fn children_of(&self, parent_id: &str) -> &[&'a Task] {
        self.children.get(parent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.parents.len() + self.standalone.len() + self.subtasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split the tasks of one workflow state into parents, standalone tasks and
/// subtasks, and index subtasks by parent id.
///
/// A task with a parent reference is a subtask whatever its declared
/// structure. A subtask whose parent is not a parent task in this same
/// partition is kept and recorded as an orphan.
pub fn build_partition<'a, I>(tasks: I) -> Partition<'a>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut partition = Partition::default();
    let mut by_id: HashMap<&'a str, &'a Task> = HashMap::new();

    for task in tasks {
        by_id.entry(task.id.as_str()).or_insert(task);
        if task.parent_ref().is_some() {
            partition.subtasks.push(task);
        } else if task.is_parent() {
            partition.parents.push(task);
        } else {
            partition.standalone.push(task);
        }
    }

    for &sub in &partition.subtasks {
        let Some(parent_id) = sub.parent_ref() else { continue };
        match by_id.get(parent_id) {
            Some(parent) if parent.is_parent() && parent.parent_ref().is_none() => {
                partition.children.entry(parent.id.as_str()).or_default().push(sub);
            }
            Some(_) => {
                warn!("subtask {} points at {}, which is not a parent task", sub.id, parent_id);
                partition.orphans.push(Orphan { task: sub, reason: OrphanReason::NotAParent });
            }
            None => {
                warn!("subtask {} points at missing parent {}", sub.id, parent_id);
                partition.orphans.push(Orphan { task: sub, reason: OrphanReason::ParentMissing });
            }
        }
    }

    debug!(
        "partition: {} parent(s), {} standalone, {} subtask(s), {} orphan(s)",
        partition.parents.len(),
        partition.standalone.len(),
        partition.subtasks.len(),
        partition.orphans.len()
    );
    partition
}

/// Bucket a whole snapshot by workflow state, keeping input order per bucket.
pub fn partition_by_workflow_state<'a, I>(tasks: I) -> HashMap<WorkflowState, Vec<&'a Task>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut buckets: HashMap<WorkflowState, Vec<&'a Task>> = HashMap::new();
    for task in tasks {
        buckets.entry(task.workflow_state).or_default().push(task);
    }
    buckets
}

/// Workflow states that hold at least one task, in display precedence.
pub fn visible_sections(buckets: &HashMap<WorkflowState, Vec<&Task>>) -> Vec<WorkflowState> {
    WorkflowState::DISPLAY_ORDER
        .into_iter()
        .filter(|state| buckets.get(state).is_some_and(|tasks| !tasks.is_empty()))
        .collect()
}
