//! Structured config: the parsed form of a launcher config file

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::args::{Value, ValueKind};

/// One entry of a config group, scalar or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Scalar(Value),
    /// Null, list or nested mapping
    Other(serde_json::Value),
}

impl Entry {
    pub fn kind(&self) -> ValueKind {
        match self {
            Entry::Scalar(value) => value.kind(),
            Entry::Other(_) => ValueKind::Nested,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Entry::Other(serde_json::Value::Null))
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Scalar(value)
    }
}

/// Parameter entries of one config group.
pub type Section = BTreeMap<String, Entry>;

/// Top-level groups recognized in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Params,
    Autotune,
    Timeline,
    StallCheck,
    LibraryOptions,
}

impl Group {
    pub const ALL: [Group; 5] =
        [Group::Params, Group::Autotune, Group::Timeline, Group::StallCheck, Group::LibraryOptions];

    pub fn name(self) -> &'static str {
        match self {
            Group::Params => "params",
            Group::Autotune => "autotune",
            Group::Timeline => "timeline",
            Group::StallCheck => "stall_check",
            Group::LibraryOptions => "library_options",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Nested config mapping with the recognized top-level groups.
///
/// Unrecognized top-level keys are dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredConfig {
    pub controller: Option<String>,
    pub params: Option<Section>,
    pub autotune: Option<Section>,
    pub timeline: Option<Section>,
    pub stall_check: Option<Section>,
    pub library_options: Option<Section>,
}

impl StructuredConfig {
    /// Build from an in-memory JSON document, e.g. `json!({"params": {...}})`.
    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// The group's entries, or `None` when the group is missing or empty.
    pub fn section(&self, group: Group) -> Option<&Section> {
        let section = match group {
            Group::Params => &self.params,
            Group::Autotune => &self.autotune,
            Group::Timeline => &self.timeline,
            Group::StallCheck => &self.stall_check,
            Group::LibraryOptions => &self.library_options,
        };
        section.as_ref().filter(|entries| !entries.is_empty())
    }

    /// The configured controller name, ignoring an empty string.
    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref().filter(|name| !name.is_empty())
    }
}

/// Look up a non-null entry in a section.
pub fn lookup<'a>(section: &'a Section, key: &str) -> Option<&'a Entry> {
    section.get(key).filter(|entry| !entry.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_group_counts_as_absent() {
        let cfg = StructuredConfig::from_json(json!({"autotune": {}, "params": {"cache_capacity": 1}}))
            .unwrap();
        assert!(cfg.section(Group::Autotune).is_none());
        assert!(cfg.section(Group::Params).is_some());
        assert!(cfg.section(Group::Timeline).is_none());
    }

    #[test]
    fn null_entries_are_skipped_by_lookup() {
        let cfg = StructuredConfig::from_json(json!({"params": {"cycle_time_ms": null, "cache_capacity": 8}}))
            .unwrap();
        let params = cfg.section(Group::Params).unwrap();
        assert_eq!(lookup(params, "cycle_time_ms"), None);
        assert_eq!(lookup(params, "cache_capacity"), Some(&Entry::from(Value::Int(8))));
    }

    #[test]
    fn scalar_kinds_are_preserved() {
        let cfg = StructuredConfig::from_json(json!({
            "autotune": {"enabled": true, "gaussian_process_noise": 0.5, "log_file": "tune.csv"}
        }))
        .unwrap();
        let autotune = cfg.section(Group::Autotune).unwrap();
        assert_eq!(lookup(autotune, "enabled"), Some(&Entry::from(Value::Bool(true))));
        assert_eq!(
            lookup(autotune, "gaussian_process_noise"),
            Some(&Entry::from(Value::Float(0.5)))
        );
        assert_eq!(lookup(autotune, "log_file"), Some(&Entry::from(Value::Text("tune.csv".into()))));
    }

    #[test]
    fn empty_controller_is_ignored() {
        let cfg = StructuredConfig::from_json(json!({"controller": ""})).unwrap();
        assert_eq!(cfg.controller(), None);
        let cfg = StructuredConfig::from_json(json!({"controller": "Gloo"})).unwrap();
        assert_eq!(cfg.controller(), Some("Gloo"));
    }

    #[test]
    fn controller_name_is_not_trimmed() {
        let cfg = StructuredConfig::from_json(json!({"controller": " mpi "})).unwrap();
        assert_eq!(cfg.controller(), Some(" mpi "));
    }

    #[test]
    fn nested_entries_are_kept_as_other() {
        let cfg = StructuredConfig::from_json(json!({
            "params": {"cache_capacity": 4, "tuning": {"level": 1}, "hosts": ["a", "b"]}
        }))
        .unwrap();
        let params = cfg.section(Group::Params).unwrap();
        assert_eq!(lookup(params, "cache_capacity"), Some(&Entry::from(Value::Int(4))));
        assert_eq!(lookup(params, "tuning").map(Entry::kind), Some(ValueKind::Nested));
        assert_eq!(lookup(params, "hosts").map(Entry::kind), Some(ValueKind::Nested));
    }

    #[test]
    fn unknown_top_level_keys_are_dropped() {
        let cfg = StructuredConfig::from_json(json!({"extra": {"x": 1}})).unwrap();
        assert_eq!(cfg, StructuredConfig::default());
    }
}
