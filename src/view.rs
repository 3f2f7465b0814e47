//! Renderer-agnostic view tree.
//!
//! [`ViewProjector`] composes partitioning, sequencing and progress into one
//! ordered tree per workflow state. Renderers turn it into glyphs or markup;
//! nodes only carry the positional hints (`is_last`) needed to do so.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use crate::error::{OrphanReason, Warning};
use crate::fields::{MetadataField, Priority, Status, TaskType, WorkflowState};
use crate::hierarchy::{build_partition, partition_by_workflow_state, visible_sections, Partition};
use crate::normalize::{default_normalizer, Normalizer};
use crate::progress::resolve_progress;
use crate::sequence::{group_by_sequence_step, is_parallel_group};
use crate::task::{normalise_tags, Progress, Task};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Parent,
    Standalone,
    Subtask,
    ParallelGroup,
}

/// Canonical display fields of one task.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: Status,
    pub priority: Priority,
    pub workflow_state: WorkflowState,
    pub parent_id: Option<String>,
    pub sequence: Option<String>,
    pub tags: Vec<String>,
    pub assignee: Option<String>,
    pub area: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub updated_date: Option<NaiveDate>,
    pub archived_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    pub kind: NodeKind,
    /// Absent for parallel-group nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskFields>,
    /// Step key, for subtasks and parallel groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphaned: Option<OrphanReason>,
    pub is_last: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    fn leaf(kind: NodeKind, task: TaskFields) -> Self {
        ViewNode { kind, task: Some(task), step: None, progress: None, orphaned: None, is_last: false, children: Vec::new() }
    }

    /// Canonical priority when it differs from the default.
    pub fn priority_marker(&self) -> Option<Priority> {
        self.task.as_ref().map(|t| t.priority).filter(|p| p.is_non_default())
    }

    /// Depth-first walk over this node and everything below it.
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s ViewNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Tallies for one section.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionCounts {
    pub parents: usize,
    pub standalone: usize,
    pub subtasks: usize,
    pub orphans: usize,
    pub by_status: BTreeMap<Status, usize>,
}

impl SectionCounts {
    pub fn total(&self) -> usize {
        self.parents + self.standalone + self.subtasks
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriorityMarker {
    pub task_id: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewSection {
    pub state: WorkflowState,
    pub nodes: Vec<ViewNode>,
    pub counts: SectionCounts,
}

impl ViewSection {
    /// Every task node in the section whose priority is not `medium`, in
    /// tree order.
    pub fn priority_markers(&self) -> Vec<PriorityMarker> {
        let mut markers = Vec::new();
        for node in &self.nodes {
            node.walk(&mut |n| {
                if let (Some(task), Some(priority)) = (n.task.as_ref(), n.priority_marker()) {
                    markers.push(PriorityMarker { task_id: task.id.clone(), priority });
                }
            });
        }
        markers
    }

    /// Find a task node anywhere in the section.
    pub fn find(&self, task_id: &str) -> Option<&ViewNode> {
        let mut found = None;
        for node in &self.nodes {
            node.walk(&mut |n| {
                if found.is_none() && n.task.as_ref().is_some_and(|t| t.id == task_id) {
                    found = Some(n);
                }
            });
        }
        found
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProjectedView {
    pub sections: Vec<ViewSection>,
    pub warnings: Vec<Warning>,
}

impl ProjectedView {
    pub fn section(&self, state: WorkflowState) -> Option<&ViewSection> {
        self.sections.iter().find(|s| s.state == state)
    }

    pub fn priority_markers(&self) -> Vec<PriorityMarker> {
        self.sections.iter().flat_map(ViewSection::priority_markers).collect()
    }
}

/// Builds [`ProjectedView`]s from task snapshots.
#[derive(Debug, Clone, Copy)]
pub struct ViewProjector<'n> {
    normalizer: &'n Normalizer,
}

impl Default for ViewProjector<'static> {
    fn default() -> Self {
        ViewProjector { normalizer: default_normalizer() }
    }
}

impl<'n> ViewProjector<'n> {
    pub fn new(normalizer: &'n Normalizer) -> Self {
        ViewProjector { normalizer }
    }

    /// Project a whole snapshot: one section per non-empty workflow state,
    /// in display precedence.
    pub fn project<'a, I>(&self, tasks: I) -> ProjectedView
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let buckets = partition_by_workflow_state(tasks);
        let mut view = ProjectedView::default();
        for state in visible_sections(&buckets) {
            let tasks = buckets.get(&state).map(Vec::as_slice).unwrap_or(&[]);
            let (section, warnings) = self.project_section(state, tasks.iter().copied());
            view.sections.push(section);
            view.warnings.extend(warnings);
        }
        debug!("projected {} section(s), {} warning(s)", view.sections.len(), view.warnings.len());
        view
    }

    /// Project the tasks of a single workflow state.
    ///
    /// Parents come first in input order, then standalone tasks, then
    /// orphaned subtasks (flagged). Attached subtasks appear only under their
    /// parent, grouped into sequence cohorts.
    pub fn project_section<'a, I>(&self, state: WorkflowState, tasks: I) -> (ViewSection, Vec<Warning>)
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let partition = build_partition(tasks);
        let mut warnings: Vec<Warning> = Vec::new();
        let mut counts = SectionCounts {
            parents: partition.parents.len(),
            standalone: partition.standalone.len(),
            subtasks: partition.subtasks.len(),
            orphans: partition.orphans.len(),
            by_status: BTreeMap::new(),
        };

        let mut nodes: Vec<ViewNode> = Vec::with_capacity(partition.parents.len() + partition.standalone.len());
        for &parent in &partition.parents {
            nodes.push(self.parent_node(parent, &partition, &mut warnings));
        }
        for &task in &partition.standalone {
            nodes.push(ViewNode::leaf(NodeKind::Standalone, self.fields(task, &mut warnings)));
        }
        for orphan in &partition.orphans {
            let mut node = ViewNode::leaf(NodeKind::Standalone, self.fields(orphan.task, &mut warnings));
            node.orphaned = Some(orphan.reason);
            nodes.push(node);
            warnings.push(Warning::OrphanedSubtask(orphan.warning()));
        }

        mark_last(&mut nodes);
        for node in &nodes {
            node.walk(&mut |n| {
                if let Some(task) = &n.task {
                    *counts.by_status.entry(task.status).or_default() += 1;
                }
            });
        }

        (ViewSection { state, nodes, counts }, warnings)
    }

    fn parent_node(&self, parent: &Task, partition: &Partition<'_>, warnings: &mut Vec<Warning>) -> ViewNode {
        let children = partition.children_of(&parent.id);
        let (progress, stale) = resolve_progress(self.normalizer, parent, children.iter().copied());
        warnings.extend(stale);

        let mut node = ViewNode::leaf(NodeKind::Parent, self.fields(parent, warnings));
        node.progress = Some(progress);

        for cohort in group_by_sequence_step(children) {
            warnings.extend(cohort.inconsistencies(Some(parent.id.as_str())).into_iter().map(Warning::InconsistentSequence));
            let step = cohort.step.to_string();
            let mut members: Vec<ViewNode> = cohort
                .members
                .iter()
                .map(|&t| {
                    let mut n = ViewNode::leaf(NodeKind::Subtask, self.fields(t, warnings));
                    n.step = Some(step.clone());
                    n
                })
                .collect();
            if is_parallel_group(&cohort) {
                node.children.push(ViewNode {
                    kind: NodeKind::ParallelGroup,
                    task: None,
                    step: Some(step),
                    progress: None,
                    orphaned: None,
                    is_last: false,
                    children: members,
                });
            } else {
                node.children.append(&mut members);
            }
        }
        node
    }

    fn fields(&self, task: &Task, warnings: &mut Vec<Warning>) -> TaskFields {
        let status = self.normalizer.status(&task.status);
        if status.was_unrecognized {
            warnings.push(unrecognized(task, MetadataField::Status, &task.status));
        }
        let priority = self.normalizer.priority(task.priority.as_deref());
        if priority.was_unrecognized {
            warnings.push(unrecognized(task, MetadataField::Priority, task.priority.as_deref().unwrap_or_default()));
        }
        TaskFields {
            id: task.id.clone(),
            title: task.title.clone(),
            task_type: self.normalizer.task_type(&task.task_type).value,
            status: status.value,
            priority: priority.value,
            workflow_state: task.workflow_state,
            parent_id: task.parent_ref().map(str::to_string),
            sequence: task.sequence_code().map(str::to_string),
            tags: normalise_tags(&task.tags),
            assignee: task.assignee.clone(),
            area: task.area.clone(),
            created_date: task.created_date,
            updated_date: task.updated_date,
            archived_date: task.archived_date,
        }
    }
}

fn unrecognized(task: &Task, field: MetadataField, raw: &str) -> Warning {
    Warning::UnrecognizedValue { task_id: task.id.clone(), field, raw: raw.to_string() }
}

/// Flag the final node at every level. Needs the complete list, so it runs
/// once per section after assembly.
fn mark_last(nodes: &mut [ViewNode]) {
    let len = nodes.len();
    for (i, node) in nodes.iter_mut().enumerate() {
        node.is_last = i + 1 == len;
        mark_last(&mut node.children);
    }
}
