//! Launcher flags shared by all subcommands.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::{load_config, resolve};
use crate::domain::{ArgField, LaunchArgs, OverrideSet, StructuredConfig, Value};

#[derive(Args, Debug, Default)]
pub struct LaunchFlags {
    /// Path to a launcher config file (.yaml, .yml, .toml or .json)
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Use Gloo for coordination
    #[arg(long, conflicts_with = "mpi")]
    pub gloo: bool,

    /// Use MPI for coordination
    #[arg(long)]
    pub mpi: bool,

    /// Fusion buffer threshold in MB
    #[arg(long, value_name = "MB", allow_negative_numbers = true)]
    pub fusion_threshold_mb: Option<i64>,

    /// Cycle time in milliseconds
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub cycle_time_ms: Option<f64>,

    /// Response cache capacity (0 disables the cache)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub cache_capacity: Option<i64>,

    /// Perform hierarchical allreduce
    #[arg(long)]
    pub hierarchical_allreduce: bool,

    /// Perform hierarchical allgather
    #[arg(long)]
    pub hierarchical_allgather: bool,

    /// Tune parameters at runtime
    #[arg(long)]
    pub autotune: bool,

    /// CSV file for autotune results
    #[arg(long, value_name = "FILE")]
    pub autotune_log_file: Option<String>,

    /// Samples discarded before autotune scoring starts
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub autotune_warmup_samples: Option<i64>,

    /// Steps recorded per autotune sample
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub autotune_steps_per_sample: Option<i64>,

    /// Maximum Bayesian optimization samples
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub autotune_bayes_opt_max_samples: Option<i64>,

    /// Gaussian process noise, in [0, 1]
    #[arg(long, value_name = "ALPHA", allow_negative_numbers = true)]
    pub autotune_gaussian_process_noise: Option<f64>,

    /// Write a timeline to this file
    #[arg(long, value_name = "FILE")]
    pub timeline_filename: Option<String>,

    /// Mark cycles in the timeline
    #[arg(long)]
    pub timeline_mark_cycles: bool,

    /// Disable the stall check
    #[arg(long)]
    pub no_stall_check: bool,

    /// Seconds before a stall warning
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub stall_check_warning_time_seconds: Option<i64>,

    /// Seconds before a stalled job shuts down (0 never shuts down)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub stall_check_shutdown_time_seconds: Option<i64>,

    /// Disable MPI threading support
    #[arg(long)]
    pub mpi_threads_disable: bool,

    /// Number of NCCL streams
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub num_nccl_streams: Option<i64>,

    /// MLSL background thread affinity
    #[arg(long, value_name = "CORE", allow_negative_numbers = true)]
    pub mlsl_bgt_affinity: Option<i64>,
}

fn flag(set: bool) -> Option<Value> {
    set.then_some(Value::Bool(true))
}

impl LaunchFlags {
    /// Apply given flags on top of the built-in defaults, recording each as an override.
    pub fn into_launch_args(self) -> Result<(LaunchArgs, OverrideSet)> {
        let mut args = LaunchArgs::launcher_defaults();
        args.use_gloo = self.gloo;
        args.use_mpi = self.mpi;

        let given = [
            (ArgField::FusionThresholdMb, self.fusion_threshold_mb.map(Value::Int)),
            (ArgField::CycleTimeMs, self.cycle_time_ms.map(Value::Float)),
            (ArgField::CacheCapacity, self.cache_capacity.map(Value::Int)),
            (ArgField::HierarchicalAllreduce, flag(self.hierarchical_allreduce)),
            (ArgField::HierarchicalAllgather, flag(self.hierarchical_allgather)),
            (ArgField::Autotune, flag(self.autotune)),
            (ArgField::AutotuneLogFile, self.autotune_log_file.map(Value::Text)),
            (ArgField::AutotuneWarmupSamples, self.autotune_warmup_samples.map(Value::Int)),
            (ArgField::AutotuneStepsPerSample, self.autotune_steps_per_sample.map(Value::Int)),
            (
                ArgField::AutotuneBayesOptMaxSamples,
                self.autotune_bayes_opt_max_samples.map(Value::Int),
            ),
            (
                ArgField::AutotuneGaussianProcessNoise,
                self.autotune_gaussian_process_noise.map(Value::Float),
            ),
            (ArgField::TimelineFilename, self.timeline_filename.map(Value::Text)),
            (ArgField::TimelineMarkCycles, flag(self.timeline_mark_cycles)),
            (ArgField::NoStallCheck, flag(self.no_stall_check)),
            (
                ArgField::StallCheckWarningTimeSeconds,
                self.stall_check_warning_time_seconds.map(Value::Int),
            ),
            (
                ArgField::StallCheckShutdownTimeSeconds,
                self.stall_check_shutdown_time_seconds.map(Value::Int),
            ),
            (ArgField::MpiThreadsDisable, flag(self.mpi_threads_disable)),
            (ArgField::NumNcclStreams, self.num_nccl_streams.map(Value::Int)),
            (ArgField::MlslBgtAffinity, self.mlsl_bgt_affinity.map(Value::Int)),
        ];

        let mut overrides = OverrideSet::new();
        for (field, value) in given {
            if let Some(value) = value {
                args.set(field, &value)?;
                overrides.insert(field);
            }
        }
        Ok((args, overrides))
    }

    /// Resolve flags, config file and defaults into a validated argument set.
    pub fn resolve(self) -> Result<LaunchArgs> {
        let config = match &self.config_file {
            Some(path) => load_config(path)?,
            None => StructuredConfig::default(),
        };
        let (args, overrides) = self.into_launch_args()?;
        tracing::debug!("{} parameter(s) set on the command line", overrides.len());

        resolve(&args, &config, &overrides).context("Invalid launcher configuration")
    }
}
