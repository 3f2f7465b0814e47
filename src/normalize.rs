//! Mapping of raw and legacy metadata strings onto canonical values.
//!
//! Every raw value is reduced to a lookup key (see [`lookup_key`]) and then
//! resolved through an alias table. The tables are plain data: adding a new
//! legacy format means adding a row here or in an alias config file.

use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;

use crate::config::AliasConfig;
use crate::error::{ConfigError, UnrecognizedValueError};
use crate::fields::{MetadataField, Priority, Status, TaskType};

const STATUS_ALIASES: &[(&str, Status)] = &[
    ("todo", Status::Todo),
    ("to_do", Status::Todo),
    ("open", Status::Todo),
    ("pending", Status::Todo),
    ("new", Status::Todo),
    ("not_started", Status::Todo),
    ("in_progress", Status::InProgress),
    ("inprogress", Status::InProgress),
    ("doing", Status::InProgress),
    ("started", Status::InProgress),
    ("active", Status::InProgress),
    ("wip", Status::InProgress),
    ("done", Status::Done),
    ("complete", Status::Done),
    ("completed", Status::Done),
    ("finished", Status::Done),
    ("closed", Status::Done),
    ("blocked", Status::Blocked),
    ("on_hold", Status::Blocked),
    ("waiting", Status::Blocked),
    ("archived", Status::Archived),
    ("archive", Status::Archived),
];

const PRIORITY_ALIASES: &[(&str, Priority)] = &[
    ("low", Priority::Low),
    ("minor", Priority::Low),
    ("medium", Priority::Medium),
    ("normal", Priority::Medium),
    ("med", Priority::Medium),
    ("high", Priority::High),
    ("major", Priority::High),
    ("highest", Priority::Highest),
    ("critical", Priority::Highest),
    ("urgent", Priority::Highest),
];

const TYPE_ALIASES: &[(&str, TaskType)] = &[
    ("task", TaskType::Task),
    ("feature", TaskType::Feature),
    ("bug", TaskType::Bug),
    ("bugfix", TaskType::Bug),
    ("chore", TaskType::Chore),
    ("documentation", TaskType::Documentation),
    ("docs", TaskType::Documentation),
    ("doc", TaskType::Documentation),
    ("test", TaskType::Test),
    ("tests", TaskType::Test),
    ("spike", TaskType::Spike),
    ("research", TaskType::Spike),
    ("idea", TaskType::Idea),
];

/// Result of a safe normalization: never fails, but reports whether the
/// input had to fall back to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<T> {
    pub value: T,
    pub was_unrecognized: bool,
}

impl<T> Normalized<T> {
    fn known(value: T) -> Self {
        Normalized { value, was_unrecognized: false }
    }

    fn fallback(value: T) -> Self {
        Normalized { value, was_unrecognized: true }
    }
}

/// Reduce a raw metadata string to its alias-table key.
///
/// The input is lowercased, then leading and trailing characters that are
/// not alphanumeric (emoji, variation selectors, punctuation) are dropped and
/// runs of whitespace, `-` and `_` collapse to a single `_`.
/// `"🟡 To Do"` and `"to-do"` both become `"to_do"`.
///
/// Lowercasing comes first so that a key is its own key: some uppercase
/// letters lowercase to a letter plus a combining mark.
pub fn lookup_key(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let trimmed = lowered.trim_matches(|c: char| !c.is_alphanumeric());
    let mut key = String::with_capacity(trimmed.len());
    let mut pending_sep = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep {
            key.push('_');
            pending_sep = false;
        }
        key.push(ch);
    }
    key
}

/// Alias tables for the three normalized metadata fields.
#[derive(Debug, Clone)]
pub struct Normalizer {
    status: HashMap<String, Status>,
    priority: HashMap<String, Priority>,
    task_type: HashMap<String, TaskType>,
}

impl Default for Normalizer {
    fn default() -> Self {
        fn table<T: Clone>(rows: &[(&str, T)]) -> HashMap<String, T> {
            rows.iter().map(|(k, v)| (lookup_key(k), v.clone())).collect()
        }
        Normalizer {
            status: table(STATUS_ALIASES),
            priority: table(PRIORITY_ALIASES),
            task_type: table(TYPE_ALIASES),
        }
    }
}

impl Normalizer {
    /// Built-in tables extended with the aliases from `config`.
    ///
    /// Alias targets must be canonical values, and an alias may not spell a
    /// canonical value itself. The first entry breaking either rule fails
    /// the whole config.
    pub fn with_config(config: &AliasConfig) -> Result<Self, ConfigError> {
        let base = Normalizer::default();
        let mut merged = base.clone();

        let canonical_status: Vec<&str> = Status::ALL.iter().map(|s| s.as_str()).collect();
        let canonical_priority: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
        let canonical_types = TaskType::CANONICAL;
        let canonical_type: Vec<&str> = canonical_types.iter().map(TaskType::as_str).collect();

        for (alias, target) in &config.status {
            let key = alias_key(MetadataField::Status, alias, &canonical_status)?;
            let value = base.strict_status(target).map_err(|_| invalid(MetadataField::Status, alias, target))?;
            merged.status.insert(key, value);
        }
        for (alias, target) in &config.priority {
            let key = alias_key(MetadataField::Priority, alias, &canonical_priority)?;
            let value = base.strict_priority(target).map_err(|_| invalid(MetadataField::Priority, alias, target))?;
            merged.priority.insert(key, value);
        }
        for (alias, target) in &config.task_type {
            let key = alias_key(MetadataField::Type, alias, &canonical_type)?;
            let value = base.strict_type(target).map_err(|_| invalid(MetadataField::Type, alias, target))?;
            merged.task_type.insert(key, value);
        }

        debug!(
            "alias tables: {} status, {} priority, {} type entries",
            merged.status.len(),
            merged.priority.len(),
            merged.task_type.len()
        );
        Ok(merged)
    }

    /// Safe status normalization. Unknown or empty input yields `todo`
    /// flagged as unrecognized.
    pub fn status(&self, raw: &str) -> Normalized<Status> {
        match self.status.get(&lookup_key(raw)) {
            Some(&s) => Normalized::known(s),
            None => Normalized::fallback(Status::default()),
        }
    }

    pub fn strict_status(&self, raw: &str) -> Result<Status, UnrecognizedValueError> {
        self.status
            .get(&lookup_key(raw))
            .copied()
            .ok_or_else(|| unrecognized(MetadataField::Status, raw))
    }

    /// Safe priority normalization. Absent input is `medium` without a flag.
    pub fn priority(&self, raw: Option<&str>) -> Normalized<Priority> {
        let Some(raw) = raw.filter(|r| !lookup_key(r).is_empty()) else {
            return Normalized::known(Priority::default());
        };
        match self.priority.get(&lookup_key(raw)) {
            Some(&p) => Normalized::known(p),
            None => Normalized::fallback(Priority::default()),
        }
    }

    pub fn strict_priority(&self, raw: &str) -> Result<Priority, UnrecognizedValueError> {
        self.priority
            .get(&lookup_key(raw))
            .copied()
            .ok_or_else(|| unrecognized(MetadataField::Priority, raw))
    }

    /// Safe type normalization. Tags outside the canonical set pass through
    /// as [`TaskType::Custom`]; only empty input falls back to `task`.
    pub fn task_type(&self, raw: &str) -> Normalized<TaskType> {
        let key = lookup_key(raw);
        if key.is_empty() {
            return Normalized::known(TaskType::default());
        }
        match self.task_type.get(&key) {
            Some(t) => Normalized::known(t.clone()),
            None => Normalized::known(TaskType::Custom(key)),
        }
    }

    /// Strict type normalization rejects anything outside the canonical set.
    pub fn strict_type(&self, raw: &str) -> Result<TaskType, UnrecognizedValueError> {
        self.task_type
            .get(&lookup_key(raw))
            .cloned()
            .ok_or_else(|| unrecognized(MetadataField::Type, raw))
    }
}

fn unrecognized(field: MetadataField, raw: &str) -> UnrecognizedValueError {
    UnrecognizedValueError { field, raw: raw.to_string() }
}

/// Lookup key for a configured alias, refusing keys that belong to a
/// canonical value.
fn alias_key(field: MetadataField, alias: &str, canonical: &[&str]) -> Result<String, ConfigError> {
    let key = lookup_key(alias);
    if canonical.contains(&key.as_str()) {
        return Err(ConfigError::CanonicalAlias { field, alias: alias.to_string() });
    }
    Ok(key)
}

fn invalid(field: MetadataField, alias: &str, target: &str) -> ConfigError {
    ConfigError::InvalidTarget { field, alias: alias.to_string(), target: target.to_string() }
}

/// Process-wide built-in normalizer.
pub fn default_normalizer() -> &'static Normalizer {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::default)
}

pub fn normalize_status(raw: &str) -> Normalized<Status> {
    default_normalizer().status(raw)
}

pub fn normalize_status_strict(raw: &str) -> Result<Status, UnrecognizedValueError> {
    default_normalizer().strict_status(raw)
}

pub fn normalize_priority(raw: Option<&str>) -> Normalized<Priority> {
    default_normalizer().priority(raw)
}

pub fn normalize_priority_strict(raw: &str) -> Result<Priority, UnrecognizedValueError> {
    default_normalizer().strict_priority(raw)
}

pub fn normalize_type(raw: &str) -> Normalized<TaskType> {
    default_normalizer().task_type(raw)
}

pub fn normalize_type_strict(raw: &str) -> Result<TaskType, UnrecognizedValueError> {
    default_normalizer().strict_type(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_key() {
        assert_eq!(lookup_key("🟡 To Do"), "to_do");
        assert_eq!(lookup_key("  In-Progress "), "in_progress");
        assert_eq!(lookup_key("▶️ Medium"), "medium");
        assert_eq!(lookup_key("on __ hold"), "on_hold");
        assert_eq!(lookup_key("🟡"), "");
        assert_eq!(lookup_key("Xİ"), "xi");
        let key = lookup_key("Xİ");
        assert_eq!(lookup_key(&key), key);
    }

    #[test]
    fn test_legacy_status_aliases() {
        assert_eq!(normalize_status("🟡 To Do").value, Status::Todo);
        assert_eq!(normalize_status("🔵 In Progress").value, Status::InProgress);
        assert_eq!(normalize_status("🟢 Done").value, Status::Done);
        assert_eq!(normalize_status("🔴 Blocked").value, Status::Blocked);
        assert_eq!(normalize_status("⚪ Archived").value, Status::Archived);
        assert!(!normalize_status("COMPLETED").was_unrecognized);
    }

    #[test]
    fn test_unknown_status_falls_back_with_flag() {
        let n = normalize_status("someday maybe");
        assert_eq!(n.value, Status::Todo);
        assert!(n.was_unrecognized);
        assert!(normalize_status("").was_unrecognized);
    }

    #[test]
    fn test_strict_status_rejects_unknown() {
        let err = normalize_status_strict("someday").unwrap_err();
        assert_eq!(err.field, MetadataField::Status);
        assert_eq!(err.raw, "someday");
        assert_eq!(normalize_status_strict("in_progress"), Ok(Status::InProgress));
    }

    #[test]
    fn test_status_is_idempotent() {
        for raw in ["🟡 To Do", "wip", "garbage", "", "Done", "on hold"] {
            let once = normalize_status(raw).value;
            assert_eq!(normalize_status(once.as_str()).value, once, "input {raw:?}");
        }
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(normalize_priority(None), Normalized { value: Priority::Medium, was_unrecognized: false });
        assert_eq!(normalize_priority(Some("▶️ Medium")).value, Priority::Medium);
        assert_eq!(normalize_priority(Some("🔼 High")).value, Priority::High);
        assert_eq!(normalize_priority(Some("🔽 Low")).value, Priority::Low);
        assert_eq!(normalize_priority(Some("⭐ Highest")).value, Priority::Highest);
        let unknown = normalize_priority(Some("whenever"));
        assert_eq!(unknown.value, Priority::Medium);
        assert!(unknown.was_unrecognized);
    }

    #[test]
    fn test_type_passthrough_for_synthetic_tags() {
        assert_eq!(normalize_type("🌟 Feature").value, TaskType::Feature);
        assert_eq!(normalize_type("🐞 Bug").value, TaskType::Bug);
        assert_eq!(normalize_type("Docs").value, TaskType::Documentation);
        assert_eq!(normalize_type("Enhancement").value, TaskType::Custom("enhancement".into()));
        assert_eq!(normalize_type("").value, TaskType::Task);
        assert!(normalize_type_strict("enhancement").is_err());
    }

    #[test]
    fn test_type_is_idempotent() {
        for raw in ["🌟 Feature", "Enhancement", "tech debt", "", "Xİ", "İ-x"] {
            let once = normalize_type(raw).value;
            assert_eq!(normalize_type(once.as_str()).value, once, "input {raw:?}");
        }
    }

    #[test]
    fn test_config_extends_tables() {
        let mut config = AliasConfig::default();
        config.status.insert("🚧 Under Review".into(), "in_progress".into());
        config.task_type.insert("enhancement".into(), "feature".into());
        let n = Normalizer::with_config(&config).unwrap();
        assert_eq!(n.status("Under Review").value, Status::InProgress);
        assert_eq!(n.task_type("Enhancement").value, TaskType::Feature);
        assert_eq!(n.status("todo").value, Status::Todo);
    }

    #[test]
    fn test_config_rejects_unknown_target() {
        let mut config = AliasConfig::default();
        config.priority.insert("p0".into(), "apocalyptic".into());
        match Normalizer::with_config(&config) {
            Err(ConfigError::InvalidTarget { field, alias, .. }) => {
                assert_eq!(field, MetadataField::Priority);
                assert_eq!(alias, "p0");
            }
            other => panic!("expected InvalidTarget, got {other:?}"),
        }
    }

    #[test]
    fn test_config_rejects_remapping_canonical_values() {
        let mut config = AliasConfig::default();
        config.status.insert("todo".into(), "done".into());
        config.status.insert("done".into(), "todo".into());
        assert!(matches!(
            Normalizer::with_config(&config),
            Err(ConfigError::CanonicalAlias { field: MetadataField::Status, .. })
        ));

        let mut config = AliasConfig::default();
        config.task_type.insert("🐞 Bug".into(), "chore".into());
        match Normalizer::with_config(&config) {
            Err(ConfigError::CanonicalAlias { field, alias }) => {
                assert_eq!(field, MetadataField::Type);
                assert_eq!(alias, "🐞 Bug");
            }
            other => panic!("expected CanonicalAlias, got {other:?}"),
        }
    }

    #[test]
    fn test_config_may_remap_legacy_aliases() {
        let mut config = AliasConfig::default();
        config.status.insert("on hold".into(), "todo".into());
        let n = Normalizer::with_config(&config).unwrap();
        assert_eq!(n.status("On Hold").value, Status::Todo);
        assert_eq!(n.status("blocked").value, Status::Blocked);
    }
}
