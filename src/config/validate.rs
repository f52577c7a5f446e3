//! Range checks over a fully resolved argument set

use std::fmt;

use crate::domain::{ArgField, LaunchArgs, Value};
use crate::error::ConfigError;

/// Range a numeric field must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    NonNegative,
    /// Closed interval `[0, 1]`
    UnitInterval,
}

impl Bound {
    pub fn admits(self, value: f64) -> bool {
        match self {
            Bound::NonNegative => value >= 0.0,
            Bound::UnitInterval => (0.0..=1.0).contains(&value),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::NonNegative => f.write_str(">= 0"),
            Bound::UnitInterval => f.write_str("in [0, 1]"),
        }
    }
}

/// Checked fields, in reporting order.
pub const RULES: [(ArgField, Bound); 11] = [
    (ArgField::FusionThresholdMb, Bound::NonNegative),
    (ArgField::CycleTimeMs, Bound::NonNegative),
    (ArgField::CacheCapacity, Bound::NonNegative),
    (ArgField::AutotuneWarmupSamples, Bound::NonNegative),
    (ArgField::AutotuneStepsPerSample, Bound::NonNegative),
    (ArgField::AutotuneBayesOptMaxSamples, Bound::NonNegative),
    (ArgField::StallCheckWarningTimeSeconds, Bound::NonNegative),
    (ArgField::StallCheckShutdownTimeSeconds, Bound::NonNegative),
    (ArgField::NumNcclStreams, Bound::NonNegative),
    (ArgField::MlslBgtAffinity, Bound::NonNegative),
    (ArgField::AutotuneGaussianProcessNoise, Bound::UnitInterval),
];

/// Fail on the first out-of-range field.
pub fn validate(args: &LaunchArgs) -> Result<(), ConfigError> {
    RULES.iter().try_for_each(|&(field, bound)| check(args, field, bound))
}

/// Every violation, in the same order `validate` would report them.
pub fn violations(args: &LaunchArgs) -> Vec<ConfigError> {
    RULES.iter().filter_map(|&(field, bound)| check(args, field, bound).err()).collect()
}

/// Check a single field against its rule. Fields without a rule always pass.
pub fn check_field(args: &LaunchArgs, field: ArgField) -> Result<(), ConfigError> {
    match RULES.iter().find(|(candidate, _)| *candidate == field) {
        Some(&(field, bound)) => check(args, field, bound),
        None => Ok(()),
    }
}

fn check(args: &LaunchArgs, field: ArgField, bound: Bound) -> Result<(), ConfigError> {
    let Some(value) = args.get(field) else {
        return Ok(());
    };
    let numeric = match &value {
        Value::Int(v) => *v as f64,
        Value::Float(v) => *v,
        Value::Bool(_) | Value::Text(_) => return Ok(()),
    };
    if bound.admits(numeric) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value: value.to_string(), bound })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(validate(&LaunchArgs::default()).is_ok());
        assert!(validate(&LaunchArgs::launcher_defaults()).is_ok());
    }

    #[test]
    fn negative_cycle_time_is_rejected() {
        let args = LaunchArgs { cycle_time_ms: Some(-1.0), ..LaunchArgs::default() };
        let err = validate(&args).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                field: ArgField::CycleTimeMs,
                value: "-1.0".to_string(),
                bound: Bound::NonNegative,
            }
        );
        assert_eq!(err.to_string(), "cycle_time_ms=-1.0 must be >= 0");
    }

    #[test]
    fn zero_is_accepted_for_non_negative_fields() {
        let args = LaunchArgs {
            fusion_threshold_mb: Some(0),
            cache_capacity: Some(0),
            num_nccl_streams: Some(0),
            mlsl_bgt_affinity: Some(0),
            ..LaunchArgs::default()
        };
        assert!(validate(&args).is_ok());
    }

    #[test]
    fn gaussian_noise_bounds_are_inclusive() {
        for ok in [0.0, 0.5, 1.0] {
            let args =
                LaunchArgs { autotune_gaussian_process_noise: Some(ok), ..LaunchArgs::default() };
            assert!(validate(&args).is_ok(), "{ok} should pass");
        }
        for bad in [-0.0001, 1.0001, f64::NAN] {
            let args =
                LaunchArgs { autotune_gaussian_process_noise: Some(bad), ..LaunchArgs::default() };
            let err = validate(&args).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::OutOfRange {
                    field: ArgField::AutotuneGaussianProcessNoise,
                    bound: Bound::UnitInterval,
                    ..
                }
            ));
        }
    }

    #[test]
    fn first_violation_in_rule_order_wins() {
        let args = LaunchArgs {
            mlsl_bgt_affinity: Some(-3),
            cache_capacity: Some(-1),
            autotune_gaussian_process_noise: Some(2.0),
            ..LaunchArgs::default()
        };
        let err = validate(&args).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: ArgField::CacheCapacity, .. }));

        let all = violations(&args);
        assert_eq!(all.len(), 3);
        assert!(matches!(all[1], ConfigError::OutOfRange { field: ArgField::MlslBgtAffinity, .. }));
        assert!(matches!(
            all[2],
            ConfigError::OutOfRange { field: ArgField::AutotuneGaussianProcessNoise, .. }
        ));
    }

    #[test]
    fn check_field_targets_one_rule() {
        let args = LaunchArgs { num_nccl_streams: Some(-2), ..LaunchArgs::default() };
        assert!(check_field(&args, ArgField::CacheCapacity).is_ok());
        assert!(check_field(&args, ArgField::NumNcclStreams).is_err());
        assert!(check_field(&args, ArgField::TimelineFilename).is_ok());
    }
}
