//! Launcher argument set and the identities of its fields

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A recognized launcher parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArgField {
    FusionThresholdMb,
    CycleTimeMs,
    CacheCapacity,
    HierarchicalAllreduce,
    HierarchicalAllgather,
    Autotune,
    AutotuneLogFile,
    AutotuneWarmupSamples,
    AutotuneStepsPerSample,
    AutotuneBayesOptMaxSamples,
    AutotuneGaussianProcessNoise,
    TimelineFilename,
    TimelineMarkCycles,
    NoStallCheck,
    StallCheckWarningTimeSeconds,
    StallCheckShutdownTimeSeconds,
    MpiThreadsDisable,
    NumNcclStreams,
    MlslBgtAffinity,
}

impl ArgField {
    pub const ALL: [ArgField; 19] = [
        ArgField::FusionThresholdMb,
        ArgField::CycleTimeMs,
        ArgField::CacheCapacity,
        ArgField::HierarchicalAllreduce,
        ArgField::HierarchicalAllgather,
        ArgField::Autotune,
        ArgField::AutotuneLogFile,
        ArgField::AutotuneWarmupSamples,
        ArgField::AutotuneStepsPerSample,
        ArgField::AutotuneBayesOptMaxSamples,
        ArgField::AutotuneGaussianProcessNoise,
        ArgField::TimelineFilename,
        ArgField::TimelineMarkCycles,
        ArgField::NoStallCheck,
        ArgField::StallCheckWarningTimeSeconds,
        ArgField::StallCheckShutdownTimeSeconds,
        ArgField::MpiThreadsDisable,
        ArgField::NumNcclStreams,
        ArgField::MlslBgtAffinity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArgField::FusionThresholdMb => "fusion_threshold_mb",
            ArgField::CycleTimeMs => "cycle_time_ms",
            ArgField::CacheCapacity => "cache_capacity",
            ArgField::HierarchicalAllreduce => "hierarchical_allreduce",
            ArgField::HierarchicalAllgather => "hierarchical_allgather",
            ArgField::Autotune => "autotune",
            ArgField::AutotuneLogFile => "autotune_log_file",
            ArgField::AutotuneWarmupSamples => "autotune_warmup_samples",
            ArgField::AutotuneStepsPerSample => "autotune_steps_per_sample",
            ArgField::AutotuneBayesOptMaxSamples => "autotune_bayes_opt_max_samples",
            ArgField::AutotuneGaussianProcessNoise => "autotune_gaussian_process_noise",
            ArgField::TimelineFilename => "timeline_filename",
            ArgField::TimelineMarkCycles => "timeline_mark_cycles",
            ArgField::NoStallCheck => "no_stall_check",
            ArgField::StallCheckWarningTimeSeconds => "stall_check_warning_time_seconds",
            ArgField::StallCheckShutdownTimeSeconds => "stall_check_shutdown_time_seconds",
            ArgField::MpiThreadsDisable => "mpi_threads_disable",
            ArgField::NumNcclStreams => "num_nccl_streams",
            ArgField::MlslBgtAffinity => "mlsl_bgt_affinity",
        }
    }

    /// The value kind stored for this field.
    pub fn kind(self) -> ValueKind {
        match self {
            ArgField::FusionThresholdMb
            | ArgField::CacheCapacity
            | ArgField::AutotuneWarmupSamples
            | ArgField::AutotuneStepsPerSample
            | ArgField::AutotuneBayesOptMaxSamples
            | ArgField::StallCheckWarningTimeSeconds
            | ArgField::StallCheckShutdownTimeSeconds
            | ArgField::NumNcclStreams
            | ArgField::MlslBgtAffinity => ValueKind::Integer,
            ArgField::CycleTimeMs | ArgField::AutotuneGaussianProcessNoise => ValueKind::Float,
            ArgField::HierarchicalAllreduce
            | ArgField::HierarchicalAllgather
            | ArgField::Autotune
            | ArgField::TimelineMarkCycles
            | ArgField::NoStallCheck
            | ArgField::MpiThreadsDisable => ValueKind::Boolean,
            ArgField::AutotuneLogFile | ArgField::TimelineFilename => ValueKind::Text,
        }
    }
}

impl fmt::Display for ArgField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArgField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        ArgField::ALL
            .into_iter()
            .find(|field| field.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

/// Kind of scalar a field holds or a config entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    Text,
    /// A list, mapping or other non-scalar config entry
    Nested,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueKind::Integer => "an integer",
            ValueKind::Float => "a number",
            ValueKind::Boolean => "a boolean",
            ValueKind::Text => "a string",
            ValueKind::Nested => "a list or mapping",
        };
        f.write_str(label)
    }
}

/// Scalar value as found in a structured config or read back from `LaunchArgs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Boolean,
            Value::Int(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats; nothing else converts.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// Integral floats keep a trailing `.0` so `5.0` never reads back as an integer.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Every launcher parameter, each independently absent or set.
///
/// `Default` leaves all parameters absent; [`LaunchArgs::launcher_defaults`]
/// is the built-in default layer the CLI starts from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaunchArgs {
    pub use_gloo: bool,
    pub use_mpi: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fusion_threshold_mb: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchical_allreduce: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchical_allgather: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub autotune: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autotune_log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autotune_warmup_samples: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autotune_steps_per_sample: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autotune_bayes_opt_max_samples: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autotune_gaussian_process_noise: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_mark_cycles: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_stall_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stall_check_warning_time_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stall_check_shutdown_time_seconds: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpi_threads_disable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_nccl_streams: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mlsl_bgt_affinity: Option<i64>,
}

impl LaunchArgs {
    /// Built-in defaults applied before config files and command-line flags.
    pub fn launcher_defaults() -> Self {
        Self {
            hierarchical_allreduce: Some(false),
            hierarchical_allgather: Some(false),
            autotune: Some(false),
            autotune_warmup_samples: Some(3),
            autotune_steps_per_sample: Some(10),
            autotune_bayes_opt_max_samples: Some(20),
            autotune_gaussian_process_noise: Some(0.8),
            timeline_mark_cycles: Some(false),
            no_stall_check: Some(false),
            stall_check_warning_time_seconds: Some(60),
            stall_check_shutdown_time_seconds: Some(0),
            mpi_threads_disable: Some(false),
            ..Self::default()
        }
    }

    pub fn get(&self, field: ArgField) -> Option<Value> {
        match field {
            ArgField::FusionThresholdMb => self.fusion_threshold_mb.map(Value::Int),
            ArgField::CycleTimeMs => self.cycle_time_ms.map(Value::Float),
            ArgField::CacheCapacity => self.cache_capacity.map(Value::Int),
            ArgField::HierarchicalAllreduce => self.hierarchical_allreduce.map(Value::Bool),
            ArgField::HierarchicalAllgather => self.hierarchical_allgather.map(Value::Bool),
            ArgField::Autotune => self.autotune.map(Value::Bool),
            ArgField::AutotuneLogFile => self.autotune_log_file.clone().map(Value::Text),
            ArgField::AutotuneWarmupSamples => self.autotune_warmup_samples.map(Value::Int),
            ArgField::AutotuneStepsPerSample => self.autotune_steps_per_sample.map(Value::Int),
            ArgField::AutotuneBayesOptMaxSamples => {
                self.autotune_bayes_opt_max_samples.map(Value::Int)
            }
            ArgField::AutotuneGaussianProcessNoise => {
                self.autotune_gaussian_process_noise.map(Value::Float)
            }
            ArgField::TimelineFilename => self.timeline_filename.clone().map(Value::Text),
            ArgField::TimelineMarkCycles => self.timeline_mark_cycles.map(Value::Bool),
            ArgField::NoStallCheck => self.no_stall_check.map(Value::Bool),
            ArgField::StallCheckWarningTimeSeconds => {
                self.stall_check_warning_time_seconds.map(Value::Int)
            }
            ArgField::StallCheckShutdownTimeSeconds => {
                self.stall_check_shutdown_time_seconds.map(Value::Int)
            }
            ArgField::MpiThreadsDisable => self.mpi_threads_disable.map(Value::Bool),
            ArgField::NumNcclStreams => self.num_nccl_streams.map(Value::Int),
            ArgField::MlslBgtAffinity => self.mlsl_bgt_affinity.map(Value::Int),
        }
    }

    /// Store `value` into `field`, rejecting values the field's type cannot hold.
    pub fn set(&mut self, field: ArgField, value: &Value) -> Result<(), ConfigError> {
        let mismatch =
            || ConfigError::TypeMismatch { field, expected: field.kind(), found: value.kind() };
        let int = || value.as_int().ok_or_else(mismatch);
        let float = || value.as_float().ok_or_else(mismatch);
        let flag = || value.as_bool().ok_or_else(mismatch);
        let text = || value.as_text().map(str::to_string).ok_or_else(mismatch);

        match field {
            ArgField::FusionThresholdMb => self.fusion_threshold_mb = Some(int()?),
            ArgField::CycleTimeMs => self.cycle_time_ms = Some(float()?),
            ArgField::CacheCapacity => self.cache_capacity = Some(int()?),
            ArgField::HierarchicalAllreduce => self.hierarchical_allreduce = Some(flag()?),
            ArgField::HierarchicalAllgather => self.hierarchical_allgather = Some(flag()?),
            ArgField::Autotune => self.autotune = Some(flag()?),
            ArgField::AutotuneLogFile => self.autotune_log_file = Some(text()?),
            ArgField::AutotuneWarmupSamples => self.autotune_warmup_samples = Some(int()?),
            ArgField::AutotuneStepsPerSample => self.autotune_steps_per_sample = Some(int()?),
            ArgField::AutotuneBayesOptMaxSamples => {
                self.autotune_bayes_opt_max_samples = Some(int()?)
            }
            ArgField::AutotuneGaussianProcessNoise => {
                self.autotune_gaussian_process_noise = Some(float()?)
            }
            ArgField::TimelineFilename => self.timeline_filename = Some(text()?),
            ArgField::TimelineMarkCycles => self.timeline_mark_cycles = Some(flag()?),
            ArgField::NoStallCheck => self.no_stall_check = Some(flag()?),
            ArgField::StallCheckWarningTimeSeconds => {
                self.stall_check_warning_time_seconds = Some(int()?)
            }
            ArgField::StallCheckShutdownTimeSeconds => {
                self.stall_check_shutdown_time_seconds = Some(int()?)
            }
            ArgField::MpiThreadsDisable => self.mpi_threads_disable = Some(flag()?),
            ArgField::NumNcclStreams => self.num_nccl_streams = Some(int()?),
            ArgField::MlslBgtAffinity => self.mlsl_bgt_affinity = Some(int()?),
        }
        Ok(())
    }
}

/// Fields the operator set explicitly; config files never overwrite these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet(BTreeSet<ArgField>);

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parameter names such as `cache_capacity` or `cache-capacity`.
    pub fn from_names<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|name| name.as_ref().parse::<ArgField>()).collect()
    }

    pub fn insert(&mut self, field: ArgField) -> bool {
        self.0.insert(field)
    }

    pub fn contains(&self, field: ArgField) -> bool {
        self.0.contains(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ArgField> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ArgField> for OverrideSet {
    fn from_iter<T: IntoIterator<Item = ArgField>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
