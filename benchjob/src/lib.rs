#![warn(missing_docs)]
//! # Benchjob
//!
//! Hierarchical, sparse, strongly-typed configuration for benchmark jobs.
//!
//! Benchjob describes *how* a benchmark should run without running it:
//! - **Sparse traits**: every setting is declared once per mode; only explicit values are stored
//! - **Freeze / copy**: frozen jobs are shared by reference and reject mutation
//! - **Layering**: `apply` overlays one configuration on another, across nesting levels
//! - **Mutators**: patch jobs folded into every standard job by the merge engine
//! - **Content ids**: unnamed jobs get a deterministic id derived from their traits
//! - **Resolvers**: unset traits fall back through a pluggable chain before the static default
//!
//! ## Quick Start
//!
//! ```ignore
//! use benchjob::prelude::*;
//!
//! let fast = presets::job::SHORT_RUN.with_platform(Platform::X64)?;
//! let everywhere = Job::new().with_warmup_count(2)?.as_mutator()?;
//!
//! for job in runnable_jobs(&[fast, everywhere])? {
//!     println!("{}", job.display_info());
//! }
//! ```
//!
//! ## Declaring a Mode
//!
//! ```ignore
//! static TUNING_SCHEMA: LazyLock<Schema> =
//!     LazyLock::new(|| Tuning::register_traits(Schema::builder("Tuning")).register());
//!
//! benchjob::declare_mode! {
//!     pub struct Tuning => &TUNING_SCHEMA;
//! }
//!
//! benchjob::define_traits! {
//!     Tuning {
//!         LEVEL("Level"): u32 = 0 => level, set_level;
//!     }
//! }
//! ```

// Re-export the container model
pub use benchjob_traits::{
    AnyValue, DEFAULT_ID, FALLBACK_ID, Frozen, GENERATED_PREFIX, ID_NAME, ID_SLOT, Mode,
    NestedDescriptor, NestedField, NoResolver, OrderPolicy, Resolver, ResolverChain, Result,
    SEPARATOR, Schema, SchemaBuilder, TraitComparer, TraitContainer, TraitDescriptor, TraitError,
    TraitValue, ValueField, generate_id, numeric_cmp, presentation, resolved_id,
};

// Re-export macros
pub use benchjob_traits::{declare_mode, define_traits};

// Re-export the job model
pub use benchjob_jobs::{
    AccuracyMode, Affinity, Arguments, EngineResolver, EnvironmentMode, EnvironmentVariables,
    GcMode, HostResolver, IN_PROCESS_TOOLCHAIN, InfrastructureMode, Jit, Job, MergeEngine,
    MetaMode, OutlierMode, ParseValueError, Platform, PowerPlan, RunMode, RunStrategy, Runtime,
    TimeInterval, presets, runnable_jobs, standard_resolver,
};

// Re-export the configuration file layer
pub use benchjob_cli::{FileConfig, JobConfig, JobPlan, OrderSetting, build_plan};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Frozen, Job, MergeEngine, Mode, OrderPolicy, Platform, RunStrategy, TimeInterval,
        TraitComparer, TraitError, presets, runnable_jobs,
    };
}

/// Run the benchjob CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     benchjob::run()
/// }
/// ```
pub use benchjob_cli::run;
