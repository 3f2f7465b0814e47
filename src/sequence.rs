//! Sequence codes and parallel cohorts.
//!
//! A sequence code like `"04a"` is a step key (`"04"`) plus an optional
//! trailing lowercase letter. Siblings that share a step key form one cohort
//! and are meant to be worked in parallel. Subtasks without a code fall into
//! the sentinel step [`SENTINEL_STEP`], which always sorts last.

use log::debug;

use crate::error::InconsistentSequenceWarning;
use crate::task::Task;

/// Step key given to subtasks with no sequence code.
pub const SENTINEL_STEP: &str = "99";

/// Strip a single trailing lowercase letter to get the step key.
///
/// `"04a"` becomes `"04"`, `"04"` stays `"04"`. A code that is only one
/// letter is its own step.
pub fn parse_base_sequence(code: &str) -> &str {
    let code = code.trim();
    let mut chars = code.chars();
    match chars.next_back() {
        Some(last) if last.is_ascii_lowercase() && !chars.as_str().is_empty() => chars.as_str(),
        _ => code,
    }
}

/// Step key of a task, the sentinel when it has no code.
pub fn step_key(task: &Task) -> &str {
    task.sequence_code().map(parse_base_sequence).unwrap_or(SENTINEL_STEP)
}

/// Full code used for ordering inside a cohort.
fn order_code(task: &Task) -> &str {
    task.sequence_code().unwrap_or(SENTINEL_STEP)
}

/// Subtasks sharing one step key, ordered by full code.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceCohort<'a> {
    pub step: &'a str,
    pub members: Vec<&'a Task>,
}

impl<'a> SequenceCohort<'a> {
    pub fn is_sentinel(&self) -> bool {
        self.step == SENTINEL_STEP
    }

    pub fn member_ids(&self) -> Vec<&'a str> {
        self.members.iter().map(|t| t.id.as_str()).collect()
    }

    /// Explicit codes carried by more than one member, with those members.
    pub fn duplicate_codes(&self) -> Vec<(&'a str, Vec<&'a Task>)> {
        // Members are sorted by code, so equal codes end up adjacent.
        let coded: Vec<&'a Task> = self.members.iter().copied().filter(|t| t.sequence_code().is_some()).collect();
        coded
            .chunk_by(|a, b| a.sequence_code() == b.sequence_code())
            .filter(|group| group.len() > 1)
            .filter_map(|group| Some((group[0].sequence_code()?, group.to_vec())))
            .collect()
    }

    /// One warning per duplicated explicit code.
    pub fn inconsistencies(&self, parent_id: Option<&str>) -> Vec<InconsistentSequenceWarning> {
        self.duplicate_codes()
            .into_iter()
            .map(|(code, group)| InconsistentSequenceWarning {
                parent_id: parent_id.map(str::to_string),
                sequence: code.to_string(),
                task_ids: group.iter().map(|t| t.id.clone()).collect(),
            })
            .collect()
    }
}

/// True when the cohort should be presented as a parallel group: more than
/// one member, which includes siblings that share an identical code.
pub fn is_parallel_group(cohort: &SequenceCohort<'_>) -> bool {
    cohort.members.len() > 1
}

/// Group sibling subtasks into cohorts ordered by step key.
///
/// Step keys compare as strings, except that the sentinel step sorts after
/// everything else. Inside a cohort members order by full code, then title,
/// then id, so the result does not depend on input order.
pub fn group_by_sequence_step<'a>(subtasks: &[&'a Task]) -> Vec<SequenceCohort<'a>> {
    let mut sorted: Vec<&'a Task> = subtasks.to_vec();
    sorted.sort_by(|a, b| {
        let (sa, sb) = (step_key(a), step_key(b));
        (sa == SENTINEL_STEP)
            .cmp(&(sb == SENTINEL_STEP))
            .then_with(|| sa.cmp(sb))
            .then_with(|| order_code(a).cmp(order_code(b)))
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    });

    let cohorts: Vec<SequenceCohort<'a>> = sorted
        .chunk_by(|a, b| step_key(a) == step_key(b))
        .map(|chunk| SequenceCohort { step: step_key(chunk[0]), members: chunk.to_vec() })
        .collect();
    debug!("grouped {} subtask(s) into {} cohort(s)", subtasks.len(), cohorts.len());
    cohorts
}

/// Suggest the code for a new subtask appended after its siblings.
///
/// Takes the highest numeric step (ignoring the sentinel), adds one and pads
/// to at least two digits, or to the widest existing numeric step.
pub fn next_sequence_code(subtasks: &[&Task]) -> String {
    let mut highest: Option<u32> = None;
    let mut width = 2;
    for task in subtasks {
        let Some(code) = task.sequence_code() else { continue };
        let step = parse_base_sequence(code);
        if step == SENTINEL_STEP {
            continue;
        }
        if let Ok(n) = step.parse::<u32>() {
            highest = Some(highest.map_or(n, |h| h.max(n)));
            width = width.max(step.len());
        }
    }
    let next = highest.map_or(1, |h| h.saturating_add(1));
    format!("{next:0width$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::WorkflowState;

    fn sub(id: &str, seq: Option<&str>) -> Task {
        let mut t = Task::new(id, id.to_uppercase(), WorkflowState::Current);
        t.sequence = seq.map(str::to_string);
        t
    }

    fn layout(cohorts: &[SequenceCohort<'_>]) -> Vec<(String, Vec<String>)> {
        cohorts
            .iter()
            .map(|c| (c.step.to_string(), c.member_ids().into_iter().map(str::to_string).collect()))
            .collect()
    }

    #[test]
    fn test_parse_base_sequence() {
        assert_eq!(parse_base_sequence("04a"), "04");
        assert_eq!(parse_base_sequence("04"), "04");
        assert_eq!(parse_base_sequence("04A"), "04A");
        assert_eq!(parse_base_sequence("a"), "a");
        assert_eq!(parse_base_sequence(" 12b "), "12");
    }

    #[test]
    fn test_steps_compare_as_strings() {
        let (a, b, c) = (sub("a", Some("10")), sub("b", Some("9")), sub("c", Some("02")));
        let cohorts = group_by_sequence_step(&[&a, &b, &c]);
        let steps: Vec<_> = cohorts.iter().map(|c| c.step).collect();
        assert_eq!(steps, vec!["02", "10", "9"]);
    }

    #[test]
    fn test_unsequenced_and_literal_sentinel_sort_last() {
        let (a, b, c, d) = (sub("a", None), sub("b", Some("99")), sub("c", Some("x1")), sub("d", Some("01")));
        let cohorts = group_by_sequence_step(&[&a, &b, &c, &d]);
        assert_eq!(
            layout(&cohorts),
            vec![
                ("01".to_string(), vec!["d".to_string()]),
                ("x1".to_string(), vec!["c".to_string()]),
                ("99".to_string(), vec!["a".to_string(), "b".to_string()]),
            ]
        );
        assert!(cohorts[2].is_sentinel());
    }

    #[test]
    fn test_parallel_cohort_ordered_by_full_code() {
        let (c, b, a) = (sub("c", Some("03c")), sub("b", Some("03b")), sub("a", Some("03a")));
        let cohorts = group_by_sequence_step(&[&c, &a, &b]);
        assert_eq!(cohorts.len(), 1);
        assert_eq!(cohorts[0].member_ids(), vec!["a", "b", "c"]);
        assert!(is_parallel_group(&cohorts[0]));
        assert!(cohorts[0].inconsistencies(None).is_empty());
    }

    #[test]
    fn test_bare_code_joins_lettered_siblings() {
        let (b, a, bare) = (sub("b", Some("04b")), sub("a", Some("04a")), sub("z", Some("04")));
        let cohorts = group_by_sequence_step(&[&b, &a, &bare]);
        assert_eq!(cohorts.len(), 1);
        assert_eq!(cohorts[0].step, "04");
        assert_eq!(cohorts[0].member_ids(), vec!["z", "a", "b"]);
        assert!(is_parallel_group(&cohorts[0]));
        assert!(cohorts[0].inconsistencies(None).is_empty());
    }

    #[test]
    fn test_single_bare_code_is_not_parallel() {
        let a = sub("a", Some("04"));
        let cohorts = group_by_sequence_step(&[&a]);
        assert!(!is_parallel_group(&cohorts[0]));
    }

    #[test]
    fn test_duplicate_bare_codes_are_grouped_and_reported() {
        let (x, y) = (sub("x", Some("03")), sub("y", Some("03")));
        let cohorts = group_by_sequence_step(&[&y, &x]);
        assert_eq!(cohorts.len(), 1);
        assert!(is_parallel_group(&cohorts[0]));
        let warnings = cohorts[0].inconsistencies(Some("P"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].sequence, "03");
        assert_eq!(warnings[0].task_ids, vec!["x", "y"]);
        assert_eq!(warnings[0].parent_id.as_deref(), Some("P"));
    }

    #[test]
    fn test_unsequenced_members_are_not_duplicates() {
        let (a, b) = (sub("a", None), sub("b", None));
        let cohorts = group_by_sequence_step(&[&a, &b]);
        assert!(cohorts[0].duplicate_codes().is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_sequence_step(&[]).is_empty());
    }

    #[test]
    fn test_next_sequence_code() {
        assert_eq!(next_sequence_code(&[]), "01");
        let (a, b, c) = (sub("a", Some("01")), sub("b", Some("04b")), sub("c", None));
        assert_eq!(next_sequence_code(&[&a, &b, &c]), "05");
        let (d, e) = (sub("d", Some("009")), sub("e", Some("99")));
        assert_eq!(next_sequence_code(&[&d, &e]), "010");
    }
}
