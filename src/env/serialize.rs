//! Projection of a resolved argument set into worker environment variables

use std::collections::BTreeMap;

use super::vars::*;
use crate::domain::{ArgField, LaunchArgs, Value};

/// Environment variable name to value.
pub type EnvMapping = BTreeMap<String, String>;

const BYTES_PER_MEGABYTE: i128 = 1024 * 1024;

/// How a field value is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Plain string form of the value.
    Direct,
    /// Stored in megabytes, exported in bytes.
    MegabytesToBytes,
    /// `1` for true, `0` for false.
    Flag,
}

impl Encoding {
    pub fn encode(self, value: &Value) -> String {
        match (self, value) {
            (Encoding::MegabytesToBytes, Value::Int(mb)) => {
                (i128::from(*mb) * BYTES_PER_MEGABYTE).to_string()
            }
            (Encoding::Flag, Value::Bool(flag)) => (if *flag { "1" } else { "0" }).to_string(),
            (_, value) => value.to_string(),
        }
    }
}

/// Condition under which a variable is exported at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    AutotuneEnabled,
    TimelineConfigured,
}

impl Gate {
    pub fn is_open(self, args: &LaunchArgs) -> bool {
        match self {
            Gate::Always => true,
            Gate::AutotuneEnabled => args.autotune == Some(true),
            Gate::TimelineConfigured => {
                args.timeline_filename.as_deref().is_some_and(|name| !name.is_empty())
            }
        }
    }
}

/// One exported environment variable.
#[derive(Debug, Clone, Copy)]
pub struct Export {
    pub var: &'static str,
    pub field: ArgField,
    pub encoding: Encoding,
    pub gate: Gate,
}

const fn export(var: &'static str, field: ArgField, encoding: Encoding, gate: Gate) -> Export {
    Export { var, field, encoding, gate }
}

// Stall-check variables are ungated: workers read the disable flag to know
// to skip the check.
#[rustfmt::skip]
pub const EXPORTS: [Export; 19] = [
    export(HOROVOD_FUSION_THRESHOLD, ArgField::FusionThresholdMb, Encoding::MegabytesToBytes, Gate::Always),
    export(HOROVOD_CYCLE_TIME, ArgField::CycleTimeMs, Encoding::Direct, Gate::Always),
    export(HOROVOD_CACHE_CAPACITY, ArgField::CacheCapacity, Encoding::Direct, Gate::Always),
    export(HOROVOD_HIERARCHICAL_ALLREDUCE, ArgField::HierarchicalAllreduce, Encoding::Flag, Gate::Always),
    export(HOROVOD_HIERARCHICAL_ALLGATHER, ArgField::HierarchicalAllgather, Encoding::Flag, Gate::Always),
    export(HOROVOD_AUTOTUNE, ArgField::Autotune, Encoding::Flag, Gate::AutotuneEnabled),
    export(HOROVOD_AUTOTUNE_LOG, ArgField::AutotuneLogFile, Encoding::Direct, Gate::AutotuneEnabled),
    export(HOROVOD_AUTOTUNE_WARMUP_SAMPLES, ArgField::AutotuneWarmupSamples, Encoding::Direct, Gate::AutotuneEnabled),
    export(HOROVOD_AUTOTUNE_STEPS_PER_SAMPLE, ArgField::AutotuneStepsPerSample, Encoding::Direct, Gate::AutotuneEnabled),
    export(HOROVOD_AUTOTUNE_BAYES_OPT_MAX_SAMPLES, ArgField::AutotuneBayesOptMaxSamples, Encoding::Direct, Gate::AutotuneEnabled),
    export(HOROVOD_AUTOTUNE_GAUSSIAN_PROCESS_NOISE, ArgField::AutotuneGaussianProcessNoise, Encoding::Direct, Gate::AutotuneEnabled),
    export(HOROVOD_TIMELINE, ArgField::TimelineFilename, Encoding::Direct, Gate::TimelineConfigured),
    export(HOROVOD_TIMELINE_MARK_CYCLES, ArgField::TimelineMarkCycles, Encoding::Flag, Gate::TimelineConfigured),
    export(HOROVOD_STALL_CHECK_DISABLE, ArgField::NoStallCheck, Encoding::Flag, Gate::Always),
    export(HOROVOD_STALL_CHECK_TIME_SECONDS, ArgField::StallCheckWarningTimeSeconds, Encoding::Direct, Gate::Always),
    export(HOROVOD_STALL_SHUTDOWN_TIME_SECONDS, ArgField::StallCheckShutdownTimeSeconds, Encoding::Direct, Gate::Always),
    export(HOROVOD_MPI_THREADS_DISABLE, ArgField::MpiThreadsDisable, Encoding::Flag, Gate::Always),
    export(HOROVOD_NUM_NCCL_STREAMS, ArgField::NumNcclStreams, Encoding::Direct, Gate::Always),
    export(HOROVOD_MLSL_BGT_AFFINITY, ArgField::MlslBgtAffinity, Encoding::Direct, Gate::Always),
];

/// Build the worker environment for `args`.
///
/// Absent fields and fields behind a closed gate produce no entry, leaving the
/// worker to apply its own default.
pub fn serialize(args: &LaunchArgs) -> EnvMapping {
    EXPORTS
        .iter()
        .filter(|export| export.gate.is_open(args))
        .filter_map(|export| {
            let value = args.get(export.field)?;
            Some((export.var.to_string(), export.encoding.encode(&value)))
        })
        .collect()
}
