//! Completion roll-up for parent tasks.
//!
//! Progress is always derived from the subtasks at hand. A `progress` value
//! stored on the parent record is a cache and only ever compared against.

use log::warn;

use crate::error::Warning;
use crate::fields::Status;
use crate::normalize::Normalizer;
use crate::task::{Progress, Task};

/// Percentage rounded half-up, 0 for an empty set.
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u128;
    let total = total as u128;
    // floor(c * 100 / t + 1/2) in integers.
    ((completed * 200 + total) / (total * 2)) as u8
}

/// Completed/total/percentage over `subtasks`, counting a subtask as done
/// when its status normalizes to `done`.
pub fn compute_progress<'a, I>(normalizer: &Normalizer, subtasks: I) -> Progress
where
    I: IntoIterator<Item = &'a Task>,
{
    let (mut completed, mut total) = (0usize, 0usize);
    for task in subtasks {
        total += 1;
        if normalizer.status(&task.status).value == Status::Done {
            completed += 1;
        }
    }
    Progress { completed, total, percentage: percentage(completed, total) }
}

/// Derived progress for `parent`, plus a warning when the stored copy on the
/// parent record disagrees with it.
pub fn resolve_progress<'a, I>(normalizer: &Normalizer, parent: &Task, live_subtasks: I) -> (Progress, Option<Warning>)
where
    I: IntoIterator<Item = &'a Task>,
{
    let derived = compute_progress(normalizer, live_subtasks);
    let stale = match parent.progress {
        Some(stored) if stored != derived => {
            warn!(
                "stored progress on {} is stale: {}/{} stored, {}/{} derived",
                parent.id, stored.completed, stored.total, derived.completed, derived.total
            );
            Some(Warning::StaleProgress { parent_id: parent.id.clone(), stored, derived })
        }
        _ => None,
    };
    (derived, stale)
}
