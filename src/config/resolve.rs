//! Precedence resolution: command-line overrides > config file > defaults

use tracing::{debug, warn};

use super::validate::validate;
use crate::domain::{lookup, ArgField, Group, LaunchArgs, OverrideSet, StructuredConfig, Value};
use crate::domain::{Entry, Section, ValueKind};
use crate::error::ConfigError;

/// How a config entry turns into a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// Adopt the entry as-is.
    Direct,
    /// Derive an on/off flag from the group's `enabled` entry whenever the group is present.
    Enabled { default: bool, invert: bool },
}

/// Maps one argument field to its place in the structured config.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub field: ArgField,
    pub group: Group,
    pub key: &'static str,
    pub merge: Merge,
}

const fn direct(field: ArgField, group: Group, key: &'static str) -> Binding {
    Binding { field, group, key, merge: Merge::Direct }
}

pub const BINDINGS: [Binding; 19] = [
    direct(ArgField::FusionThresholdMb, Group::Params, "fusion_threshold_mb"),
    direct(ArgField::CycleTimeMs, Group::Params, "cycle_time_ms"),
    direct(ArgField::CacheCapacity, Group::Params, "cache_capacity"),
    direct(ArgField::HierarchicalAllreduce, Group::Params, "hierarchical_allreduce"),
    direct(ArgField::HierarchicalAllgather, Group::Params, "hierarchical_allgather"),
    Binding {
        field: ArgField::Autotune,
        group: Group::Autotune,
        key: "enabled",
        merge: Merge::Enabled { default: false, invert: false },
    },
    direct(ArgField::AutotuneLogFile, Group::Autotune, "log_file"),
    direct(ArgField::AutotuneWarmupSamples, Group::Autotune, "warmup_samples"),
    direct(ArgField::AutotuneStepsPerSample, Group::Autotune, "steps_per_sample"),
    direct(ArgField::AutotuneBayesOptMaxSamples, Group::Autotune, "bayes_opt_max_samples"),
    direct(ArgField::AutotuneGaussianProcessNoise, Group::Autotune, "gaussian_process_noise"),
    direct(ArgField::TimelineFilename, Group::Timeline, "filename"),
    direct(ArgField::TimelineMarkCycles, Group::Timeline, "mark_cycles"),
    // `no_stall_check` is the inverse of `stall_check.enabled`.
    Binding {
        field: ArgField::NoStallCheck,
        group: Group::StallCheck,
        key: "enabled",
        merge: Merge::Enabled { default: true, invert: true },
    },
    direct(ArgField::StallCheckWarningTimeSeconds, Group::StallCheck, "warning_time_seconds"),
    direct(ArgField::StallCheckShutdownTimeSeconds, Group::StallCheck, "shutdown_time_seconds"),
    direct(ArgField::MpiThreadsDisable, Group::LibraryOptions, "mpi_threads_disable"),
    direct(ArgField::NumNcclStreams, Group::LibraryOptions, "num_nccl_streams"),
    direct(ArgField::MlslBgtAffinity, Group::LibraryOptions, "mlsl_bgt_affinity"),
];

/// Resolve `args` against `config`, then validate the result.
///
/// Returns a new argument set; `args` itself is never modified, so a failed
/// resolution leaves the caller's values intact.
pub fn resolve(
    args: &LaunchArgs,
    config: &StructuredConfig,
    overrides: &OverrideSet,
) -> Result<LaunchArgs, ConfigError> {
    let mut resolved = args.clone();
    select_controller(&mut resolved, config)?;
    merge(&mut resolved, config, overrides)?;
    validate(&resolved)?;
    Ok(resolved)
}

/// Pick the controller named in config unless one is already selected.
pub fn select_controller(
    args: &mut LaunchArgs,
    config: &StructuredConfig,
) -> Result<(), ConfigError> {
    let Some(name) = config.controller() else {
        return Ok(());
    };
    if args.use_gloo || args.use_mpi {
        debug!(controller = name, "Controller already selected, ignoring config value");
        return Ok(());
    }

    match name.to_ascii_lowercase().as_str() {
        "gloo" => args.use_gloo = true,
        "mpi" => args.use_mpi = true,
        _ => {
            return Err(ConfigError::InvalidValue { key: "controller", value: name.to_string() })
        }
    }
    debug!(controller = name, "Controller selected from config");
    Ok(())
}

/// Copy config values into `args` for every field not in `overrides`.
///
/// Stops at the first mistyped entry, possibly after earlier fields were
/// written; use [`resolve`] for all-or-nothing behaviour.
pub fn merge(
    args: &mut LaunchArgs,
    config: &StructuredConfig,
    overrides: &OverrideSet,
) -> Result<(), ConfigError> {
    for group in Group::ALL {
        if let Some(section) = config.section(group) {
            warn_unrecognized(group, section);
        }
    }

    for binding in &BINDINGS {
        let Some(section) = config.section(binding.group) else {
            continue;
        };
        if overrides.contains(binding.field) {
            debug!(field = %binding.field, "Keeping command-line value over config");
            continue;
        }
        let Some(value) = config_value(binding, section)? else {
            continue;
        };
        debug!(field = %binding.field, value = %value, "Applying config value");
        args.set(binding.field, &value)?;
    }
    Ok(())
}

fn config_value(binding: &Binding, section: &Section) -> Result<Option<Value>, ConfigError> {
    let entry = match lookup(section, binding.key) {
        Some(Entry::Scalar(value)) => Some(value),
        Some(other) => {
            return Err(ConfigError::TypeMismatch {
                field: binding.field,
                expected: binding.field.kind(),
                found: other.kind(),
            })
        }
        None => None,
    };
    match binding.merge {
        Merge::Direct => Ok(entry.cloned()),
        Merge::Enabled { default, invert } => {
            let enabled = match entry {
                Some(value) => value.as_bool().ok_or(ConfigError::TypeMismatch {
                    field: binding.field,
                    expected: ValueKind::Boolean,
                    found: value.kind(),
                })?,
                None => default,
            };
            Ok(Some(Value::Bool(enabled != invert)))
        }
    }
}

fn warn_unrecognized(group: Group, section: &Section) {
    for key in section.keys() {
        let known = BINDINGS.iter().any(|b| b.group == group && b.key == key.as_str());
        if !known {
            warn!(group = %group, key = %key, "Ignoring unrecognized config key");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bound;
    use serde_json::json;

    fn config(value: serde_json::Value) -> StructuredConfig {
        StructuredConfig::from_json(value).expect("valid config")
    }

    #[test]
    fn bindings_cover_every_field_once() {
        for field in ArgField::ALL {
            let count = BINDINGS.iter().filter(|b| b.field == field).count();
            assert_eq!(count, 1, "{field} should be bound exactly once");
        }
    }

    #[test]
    fn override_beats_config() {
        let args = LaunchArgs { cache_capacity: Some(1024), ..LaunchArgs::default() };
        let overrides: OverrideSet = [ArgField::CacheCapacity].into_iter().collect();
        let cfg = config(json!({"params": {"cache_capacity": 99}}));

        let resolved = resolve(&args, &cfg, &overrides).unwrap();
        assert_eq!(resolved.cache_capacity, Some(1024));
    }

    #[test]
    fn config_value_adopted_without_override() {
        let cfg = config(json!({"params": {"fusion_threshold_mb": 64, "cycle_time_ms": 2.5}}));
        let resolved = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap();
        assert_eq!(resolved.fusion_threshold_mb, Some(64));
        assert_eq!(resolved.cycle_time_ms, Some(2.5));
    }

    #[test]
    fn missing_or_null_entries_keep_prior_value() {
        let args = LaunchArgs::launcher_defaults();
        let cfg = config(json!({"stall_check": {"warning_time_seconds": null}}));
        let resolved = resolve(&args, &cfg, &OverrideSet::new()).unwrap();
        assert_eq!(resolved.stall_check_warning_time_seconds, Some(60));
        assert_eq!(resolved.stall_check_shutdown_time_seconds, Some(0));
    }

    #[test]
    fn controller_selected_case_insensitively() {
        let cfg = config(json!({"controller": "MPI"}));
        let resolved = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap();
        assert!(resolved.use_mpi);
        assert!(!resolved.use_gloo);

        let cfg = config(json!({"controller": "gloo"}));
        let resolved = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap();
        assert!(resolved.use_gloo);
        assert!(!resolved.use_mpi);
    }

    #[test]
    fn unknown_controller_fails_without_touching_flags() {
        let args = LaunchArgs::default();
        let cfg = config(json!({"controller": "invalid"}));
        let err = resolve(&args, &cfg, &OverrideSet::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue { key: "controller", value: "invalid".to_string() }
        );
        assert!(!args.use_gloo && !args.use_mpi);
    }

    #[test]
    fn preselected_controller_skips_config() {
        let args = LaunchArgs { use_gloo: true, ..LaunchArgs::default() };
        let cfg = config(json!({"controller": "invalid"}));
        let resolved = resolve(&args, &cfg, &OverrideSet::new()).unwrap();
        assert!(resolved.use_gloo);
        assert!(!resolved.use_mpi);
    }

    #[test]
    fn autotune_group_presence_sets_flag() {
        let args = LaunchArgs::launcher_defaults();
        let cfg = config(json!({"autotune": {"warmup_samples": 5}}));
        let resolved = resolve(&args, &cfg, &OverrideSet::new()).unwrap();
        assert_eq!(resolved.autotune, Some(false));
        assert_eq!(resolved.autotune_warmup_samples, Some(5));

        let cfg = config(json!({"autotune": {"enabled": true}}));
        let resolved = resolve(&args, &cfg, &OverrideSet::new()).unwrap();
        assert_eq!(resolved.autotune, Some(true));
    }

    #[test]
    fn autotune_override_wins_over_group() {
        let args = LaunchArgs { autotune: Some(true), ..LaunchArgs::default() };
        let overrides: OverrideSet = [ArgField::Autotune].into_iter().collect();
        let cfg = config(json!({"autotune": {"enabled": false}}));
        let resolved = resolve(&args, &cfg, &overrides).unwrap();
        assert_eq!(resolved.autotune, Some(true));
    }

    #[test]
    fn stall_check_enabled_is_inverted() {
        let cfg = config(json!({"stall_check": {"enabled": false}}));
        let resolved = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap();
        assert_eq!(resolved.no_stall_check, Some(true));

        let cfg = config(json!({"stall_check": {"warning_time_seconds": 30}}));
        let resolved = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap();
        assert_eq!(resolved.no_stall_check, Some(false));
        assert_eq!(resolved.stall_check_warning_time_seconds, Some(30));
    }

    #[test]
    fn stall_check_override_wins_over_group() {
        let args = LaunchArgs { no_stall_check: Some(true), ..LaunchArgs::default() };
        let overrides: OverrideSet = [ArgField::NoStallCheck].into_iter().collect();
        let cfg = config(json!({"stall_check": {"enabled": true}}));
        let resolved = resolve(&args, &cfg, &overrides).unwrap();
        assert_eq!(resolved.no_stall_check, Some(true));
    }

    fn fully_set_args() -> LaunchArgs {
        LaunchArgs {
            use_gloo: false,
            use_mpi: false,
            fusion_threshold_mb: Some(1),
            cycle_time_ms: Some(1.5),
            cache_capacity: Some(1),
            hierarchical_allreduce: Some(false),
            hierarchical_allgather: Some(false),
            autotune: Some(true),
            autotune_log_file: Some("a.csv".to_string()),
            autotune_warmup_samples: Some(1),
            autotune_steps_per_sample: Some(1),
            autotune_bayes_opt_max_samples: Some(1),
            autotune_gaussian_process_noise: Some(0.1),
            timeline_filename: Some("a.json".to_string()),
            timeline_mark_cycles: Some(false),
            no_stall_check: Some(true),
            stall_check_warning_time_seconds: Some(1),
            stall_check_shutdown_time_seconds: Some(1),
            mpi_threads_disable: Some(false),
            num_nccl_streams: Some(1),
            mlsl_bgt_affinity: Some(1),
        }
    }

    fn conflicting_config() -> StructuredConfig {
        config(json!({
            "params": {
                "fusion_threshold_mb": 7,
                "cycle_time_ms": 0.5,
                "cache_capacity": 7,
                "hierarchical_allreduce": true,
                "hierarchical_allgather": true
            },
            "autotune": {
                "enabled": false,
                "log_file": "b.csv",
                "warmup_samples": 7,
                "steps_per_sample": 7,
                "bayes_opt_max_samples": 7,
                "gaussian_process_noise": 0.9
            },
            "timeline": {"filename": "b.json", "mark_cycles": true},
            "stall_check": {"enabled": true, "warning_time_seconds": 7, "shutdown_time_seconds": 7},
            "library_options": {
                "mpi_threads_disable": true,
                "num_nccl_streams": 7,
                "mlsl_bgt_affinity": 7
            }
        }))
    }

    #[test]
    fn every_bound_field_changes_without_override() {
        let args = fully_set_args();
        let resolved = resolve(&args, &conflicting_config(), &OverrideSet::new()).unwrap();
        for binding in &BINDINGS {
            assert_ne!(
                resolved.get(binding.field),
                args.get(binding.field),
                "{} should take the config value",
                binding.field
            );
        }
    }

    #[test]
    fn every_overridden_field_keeps_its_value() {
        let args = fully_set_args();
        let overrides: OverrideSet = BINDINGS.iter().map(|b| b.field).collect();
        assert_eq!(overrides.len(), BINDINGS.len());

        let resolved = resolve(&args, &conflicting_config(), &overrides).unwrap();
        for binding in &BINDINGS {
            assert_eq!(resolved.get(binding.field), args.get(binding.field), "{}", binding.field);
        }
        assert_eq!(resolved, args);
    }

    #[test]
    fn padded_controller_name_is_rejected() {
        let cfg = config(json!({"controller": " mpi "}));
        let err = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue { key: "controller", value: " mpi ".to_string() }
        );
    }

    #[test]
    fn absent_group_leaves_enabled_flags_alone() {
        let args = LaunchArgs::default();
        let resolved = resolve(&args, &StructuredConfig::default(), &OverrideSet::new()).unwrap();
        assert_eq!(resolved, args);
    }

    #[test]
    fn validation_runs_on_merged_values() {
        let cfg = config(json!({"params": {"cycle_time_ms": -1}}));
        let err = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { field: ArgField::CycleTimeMs, bound: Bound::NonNegative, .. }
        ));
    }

    #[test]
    fn overridden_values_are_still_validated() {
        let args = LaunchArgs { num_nccl_streams: Some(-1), ..LaunchArgs::default() };
        let overrides: OverrideSet = [ArgField::NumNcclStreams].into_iter().collect();
        let cfg = config(json!({"library_options": {"num_nccl_streams": 2}}));
        let err = resolve(&args, &cfg, &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: ArgField::NumNcclStreams, .. }));
    }

    #[test]
    fn mistyped_entry_is_reported() {
        let cfg = config(json!({"timeline": {"filename": 7}}));
        let err = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TypeMismatch {
                field: ArgField::TimelineFilename,
                expected: ValueKind::Text,
                found: ValueKind::Integer,
            }
        );

        let cfg = config(json!({"autotune": {"enabled": "yes"}}));
        assert!(resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).is_err());
    }

    #[test]
    fn nested_value_for_bound_key_is_reported() {
        let cfg = config(json!({"params": {"cache_capacity": {"size": 4}}}));
        let err = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TypeMismatch {
                field: ArgField::CacheCapacity,
                expected: ValueKind::Integer,
                found: ValueKind::Nested,
            }
        );

        let cfg = config(json!({"stall_check": {"enabled": [true]}}));
        let err = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TypeMismatch { field: ArgField::NoStallCheck, found: ValueKind::Nested, .. }
        ));
    }

    #[test]
    fn nested_unrecognized_keys_are_ignored() {
        let cfg = config(json!({
            "params": {"cache_capacity": 4, "tuning": {"level": 1}, "hosts": ["a", "b"]}
        }));
        let resolved = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap();
        assert_eq!(resolved.cache_capacity, Some(4));
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let cfg = config(json!({"params": {"fusion_threshold": 8, "cache_capacity": 4}}));
        let resolved = resolve(&LaunchArgs::default(), &cfg, &OverrideSet::new()).unwrap();
        assert_eq!(resolved.fusion_threshold_mb, None);
        assert_eq!(resolved.cache_capacity, Some(4));
    }
}
