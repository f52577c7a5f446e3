//! Environment variable names read by worker processes

// Parameter knobs
pub const HOROVOD_FUSION_THRESHOLD: &str = "HOROVOD_FUSION_THRESHOLD";
pub const HOROVOD_CYCLE_TIME: &str = "HOROVOD_CYCLE_TIME";
pub const HOROVOD_CACHE_CAPACITY: &str = "HOROVOD_CACHE_CAPACITY";
pub const HOROVOD_HIERARCHICAL_ALLREDUCE: &str = "HOROVOD_HIERARCHICAL_ALLREDUCE";
pub const HOROVOD_HIERARCHICAL_ALLGATHER: &str = "HOROVOD_HIERARCHICAL_ALLGATHER";

// Autotune knobs
pub const HOROVOD_AUTOTUNE: &str = "HOROVOD_AUTOTUNE";
pub const HOROVOD_AUTOTUNE_LOG: &str = "HOROVOD_AUTOTUNE_LOG";
pub const HOROVOD_AUTOTUNE_WARMUP_SAMPLES: &str = "HOROVOD_AUTOTUNE_WARMUP_SAMPLES";
pub const HOROVOD_AUTOTUNE_STEPS_PER_SAMPLE: &str = "HOROVOD_AUTOTUNE_STEPS_PER_SAMPLE";
pub const HOROVOD_AUTOTUNE_BAYES_OPT_MAX_SAMPLES: &str = "HOROVOD_AUTOTUNE_BAYES_OPT_MAX_SAMPLES";
pub const HOROVOD_AUTOTUNE_GAUSSIAN_PROCESS_NOISE: &str =
    "HOROVOD_AUTOTUNE_GAUSSIAN_PROCESS_NOISE";

// Timeline knobs
pub const HOROVOD_TIMELINE: &str = "HOROVOD_TIMELINE";
pub const HOROVOD_TIMELINE_MARK_CYCLES: &str = "HOROVOD_TIMELINE_MARK_CYCLES";

// Stall check knobs
pub const HOROVOD_STALL_CHECK_DISABLE: &str = "HOROVOD_STALL_CHECK_DISABLE";
pub const HOROVOD_STALL_CHECK_TIME_SECONDS: &str = "HOROVOD_STALL_CHECK_TIME_SECONDS";
pub const HOROVOD_STALL_SHUTDOWN_TIME_SECONDS: &str = "HOROVOD_STALL_SHUTDOWN_TIME_SECONDS";

// Library options knobs
pub const HOROVOD_MPI_THREADS_DISABLE: &str = "HOROVOD_MPI_THREADS_DISABLE";
pub const HOROVOD_NUM_NCCL_STREAMS: &str = "HOROVOD_NUM_NCCL_STREAMS";
pub const HOROVOD_MLSL_BGT_AFFINITY: &str = "HOROVOD_MLSL_BGT_AFFINITY";
