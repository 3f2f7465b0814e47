//! # taskview - task hierarchy & sequencing engine
//!
//! One shared, renderer-agnostic derivation of task data for every front end
//! (CLI formatter, web tables and cards, API responses).
//!
//! ## What it does
//!
//! - **Normalization**: legacy and canonical metadata strings ("🟡 To Do",
//!   "▶️ Medium", "🌟 Feature") become canonical enums via data-driven alias
//!   tables ([`normalize`]).
//! - **Sequencing**: subtask sequence codes are grouped into ordered cohorts;
//!   `"04a"` and `"04b"` form one parallel cohort ([`sequence`]).
//! - **Progress**: completed/total/percentage always derived from the live
//!   subtasks, never from a stored copy ([`progress`]).
//! - **Hierarchy**: a workflow state's tasks split into parents, standalone
//!   tasks and subtasks, orphans flagged but kept ([`hierarchy`]).
//! - **Projection**: an ordered node tree per workflow state with positional
//!   hints for tree-drawing renderers ([`view`]).
//!
//! ## Hierarchy Example
//!
//! - **Parent**: "Authentication"
//!   - `01` "Schema"
//!   - `02` "Session store"
//!   - parallel `04`: `04a` "Login form", `04b` "Signup form"
//! - **Standalone**: "Fix typo in README"
//!
//! ## Usage
//!
//! ```
//! use taskview::{Task, ViewProjector, WorkflowState};
//!
//! let tasks = vec![Task::new("T-1", "Fix typo", WorkflowState::Current)];
//! let view = ViewProjector::default().project(&tasks);
//! assert_eq!(view.sections.len(), 1);
//! ```
//!
//! Everything is a pure function over an immutable snapshot. Callers re-run
//! the projection after every change; nothing is cached between calls.

pub mod config;
pub mod error;
pub mod fields;
pub mod hierarchy;
pub mod normalize;
pub mod progress;
pub mod sequence;
pub mod snapshot;
pub mod task;
pub mod view;

pub use error::{ConfigError, SnapshotError, UnrecognizedValueError, Warning};
pub use fields::{MetadataField, Priority, Status, TaskStructure, TaskType, WorkflowState};
pub use normalize::{Normalized, Normalizer};
pub use snapshot::Snapshot;
pub use task::{Progress, Task};
pub use view::{NodeKind, ProjectedView, ViewNode, ViewProjector, ViewSection};
