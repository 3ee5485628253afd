#![warn(missing_docs)]
//! Benchjob Jobs - Benchmark Job Model
//!
//! This crate defines the benchmark configuration built on `benchjob-traits`:
//! - `Job`, composed of environment, run, infrastructure, accuracy and meta modes
//! - Frozen presets (`presets::job::SHORT_RUN`, ...)
//! - `with_*` copy-and-change builders
//! - `MergeEngine` folding mutators into runnable jobs
//! - Engine and host fallbacks for unset traits

mod accuracy;
mod builder;
mod environment;
mod infrastructure;
mod job;
mod merge;
mod meta;
pub mod presets;
mod resolver;
mod run;
mod values;

pub use accuracy::AccuracyMode;
pub use environment::{EnvironmentMode, GcMode};
pub use infrastructure::{IN_PROCESS_TOOLCHAIN, InfrastructureMode};
pub use job::Job;
pub use merge::{MergeEngine, runnable_jobs};
pub use meta::MetaMode;
pub use resolver::{
    DEFAULT_ITERATION_TIME, DEFAULT_MAX_ITERATION_COUNT, DEFAULT_MAX_RELATIVE_ERROR,
    DEFAULT_MAX_WARMUP_COUNT, DEFAULT_MIN_INVOKE_COUNT, DEFAULT_MIN_ITERATION_COUNT,
    DEFAULT_MIN_ITERATION_TIME, DEFAULT_MIN_WARMUP_COUNT, DEFAULT_UNROLL_FACTOR, EngineResolver,
    HostResolver, standard_resolver,
};
pub use run::RunMode;
pub use values::{
    Affinity, Arguments, EnvironmentVariables, Jit, OutlierMode, ParseValueError, Platform,
    PowerPlan, RunStrategy, Runtime, TimeInterval,
};
