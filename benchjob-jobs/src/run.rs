//! Run mode: how many processes, warmups and iterations a benchmark gets
//!
//! Counts default to 0, meaning the engine picks a value (see
//! [`EngineResolver`](crate::EngineResolver)).

use crate::values::{RunStrategy, TimeInterval};
use benchjob_traits::{Schema, declare_mode, define_traits};
use std::sync::LazyLock;

static RUN_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| RunMode::register_traits(Schema::builder("Run")).register());

declare_mode! {
    /// Launch, warmup and iteration settings
    pub struct RunMode => &RUN_SCHEMA;
}

define_traits! {
    RunMode {
        /// Iteration scheduling strategy
        RUN_STRATEGY("RunStrategy"): RunStrategy = RunStrategy::Throughput => run_strategy, set_run_strategy;
        /// Number of benchmark processes
        LAUNCH_COUNT("LaunchCount"): u32 = 0 => launch_count, set_launch_count;
        /// Warmup iterations per process
        WARMUP_COUNT("WarmupCount"): u32 = 0 => warmup_count, set_warmup_count;
        /// Measured iterations per process
        ITERATION_COUNT("IterationCount"): u32 = 0 => iteration_count, set_iteration_count;
        /// Target duration of one iteration
        ITERATION_TIME("IterationTime"): TimeInterval = TimeInterval::ZERO => iteration_time, set_iteration_time;
        /// Invocations per iteration
        INVOCATION_COUNT("InvocationCount"): u64 = 0 => invocation_count, set_invocation_count;
        /// Invocations unrolled inside the measurement loop
        UNROLL_FACTOR("UnrollFactor"): u32 = 0 => unroll_factor, set_unroll_factor;
        /// Lower bound on measured iterations when the count is chosen automatically
        MIN_ITERATION_COUNT("MinIterationCount"): u32 = 0 => min_iteration_count, set_min_iteration_count;
        /// Upper bound on measured iterations when the count is chosen automatically
        MAX_ITERATION_COUNT("MaxIterationCount"): u32 = 0 => max_iteration_count, set_max_iteration_count;
        /// Lower bound on warmup iterations when the count is chosen automatically
        MIN_WARMUP_ITERATION_COUNT("MinWarmupIterationCount"): u32 = 0
            => min_warmup_iteration_count, set_min_warmup_iteration_count;
        /// Upper bound on warmup iterations when the count is chosen automatically
        MAX_WARMUP_ITERATION_COUNT("MaxWarmupIterationCount"): u32 = 0
            => max_warmup_iteration_count, set_max_warmup_iteration_count;
        /// Randomize memory layout between iterations
        MEMORY_RANDOMIZATION("MemoryRandomization"): bool = false
            => memory_randomization, set_memory_randomization;
    }
}
