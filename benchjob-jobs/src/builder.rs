//! Copy-and-change builders on [`Job`]
//!
//! Each builder leaves the receiver untouched and returns a mutable copy with
//! one change applied. An explicit id on the receiver survives the copy, so
//! `job.with_id("Fast")?.with_launch_count(1)?` is still called `Fast`.

use crate::accuracy::AccuracyMode;
use crate::environment::{EnvironmentMode, GcMode};
use crate::infrastructure::InfrastructureMode;
use crate::job::Job;
use crate::meta::MetaMode;
use crate::run::RunMode;
use crate::values::{
    Affinity, Arguments, EnvironmentVariables, Jit, OutlierMode, Platform, PowerPlan, RunStrategy,
    Runtime, TimeInterval,
};
use benchjob_traits::{Mode, Result};

macro_rules! with_traits {
    ($($method:ident => $mode:ident::$konst:ident: $ty:ty;)*) => {
        impl Job {
            $(
                #[doc = concat!("Copy with `", stringify!($mode), "::", stringify!($konst), "` set")]
                pub fn $method(&self, value: $ty) -> Result<Job> {
                    self.with_change(|job| $mode::$konst.set(job, value))
                }
            )*
        }
    };
}

impl Job {
    /// Copy of this job, keeping its explicit id, with `change` applied
    pub fn with_change(&self, change: impl FnOnce(&mut Job) -> Result<()>) -> Result<Job> {
        let mut job = self.unfreeze_copy();
        if let Some(id) = self.id() {
            job.set_id(id)?;
        }
        change(&mut job)?;
        Ok(job)
    }

    /// Copy with a new id
    pub fn with_id(&self, id: &str) -> Result<Job> {
        self.with_change(|job| {
            job.set_id(id)?;
            Ok(())
        })
    }

    /// Copy with every explicit trait of `source` applied on top
    pub fn with_traits_of<S>(&self, source: &S) -> Result<Job>
    where
        S: AsRef<benchjob_traits::TraitContainer> + ?Sized,
    {
        self.with_change(|job| {
            job.apply_traits(source)?;
            Ok(())
        })
    }

    /// Copy marked as the baseline
    pub fn as_baseline(&self) -> Result<Job> {
        self.with_change(|job| MetaMode::BASELINE.set(job, true))
    }

    /// Copy marked as a mutator, to be applied onto every other job
    pub fn as_mutator(&self) -> Result<Job> {
        self.with_change(|job| MetaMode::IS_MUTATOR.set(job, true))
    }

    /// Copy with the custom-default flag set to `is_default`
    pub fn as_default(&self, is_default: bool) -> Result<Job> {
        self.with_change(|job| MetaMode::IS_DEFAULT.set(job, is_default))
    }

    /// Copy that runs the benchmark exactly once per iteration
    pub fn run_once_per_iteration(&self) -> Result<Job> {
        self.with_change(|job| {
            RunMode::INVOCATION_COUNT.set(job, 1)?;
            RunMode::UNROLL_FACTOR.set(job, 1)
        })
    }

    /// Copy with one more environment variable
    pub fn with_environment_variable(&self, key: &str, value: &str) -> Result<Job> {
        let variables = EnvironmentMode::ENVIRONMENT_VARIABLES
            .get(self)
            .with(key, value);
        self.with_environment_variables(variables)
    }

    /// Copy with one more process argument
    pub fn with_argument(&self, argument: &str) -> Result<Job> {
        let arguments = InfrastructureMode::ARGUMENTS.get(self).with(argument);
        self.with_arguments(arguments)
    }

    /// Copy with the garbage collector settings of `gc` applied
    pub fn with_gc(&self, gc: &GcMode) -> Result<Job> {
        self.with_traits_of(gc)
    }
}

with_traits! {
    with_affinity => EnvironmentMode::AFFINITY: Affinity;
    with_jit => EnvironmentMode::JIT: Jit;
    with_platform => EnvironmentMode::PLATFORM: Platform;
    with_power_plan => EnvironmentMode::POWER_PLAN: PowerPlan;
    with_runtime => EnvironmentMode::RUNTIME: Runtime;
    with_environment_variables => EnvironmentMode::ENVIRONMENT_VARIABLES: EnvironmentVariables;

    with_gc_server => GcMode::SERVER: bool;
    with_gc_concurrent => GcMode::CONCURRENT: bool;
    with_gc_cpu_groups => GcMode::CPU_GROUPS: bool;
    with_gc_force => GcMode::FORCE: bool;
    with_gc_allow_very_large_objects => GcMode::ALLOW_VERY_LARGE_OBJECTS: bool;
    with_gc_retain_vm => GcMode::RETAIN_VM: bool;
    with_gc_no_affinitize => GcMode::NO_AFFINITIZE: bool;
    with_gc_heap_affinitize_mask => GcMode::HEAP_AFFINITIZE_MASK: Affinity;
    with_gc_heap_count => GcMode::HEAP_COUNT: u32;

    with_strategy => RunMode::RUN_STRATEGY: RunStrategy;
    with_launch_count => RunMode::LAUNCH_COUNT: u32;
    with_warmup_count => RunMode::WARMUP_COUNT: u32;
    with_iteration_count => RunMode::ITERATION_COUNT: u32;
    with_iteration_time => RunMode::ITERATION_TIME: TimeInterval;
    with_invocation_count => RunMode::INVOCATION_COUNT: u64;
    with_unroll_factor => RunMode::UNROLL_FACTOR: u32;
    with_min_iteration_count => RunMode::MIN_ITERATION_COUNT: u32;
    with_max_iteration_count => RunMode::MAX_ITERATION_COUNT: u32;
    with_min_warmup_count => RunMode::MIN_WARMUP_ITERATION_COUNT: u32;
    with_max_warmup_count => RunMode::MAX_WARMUP_ITERATION_COUNT: u32;
    with_memory_randomization => RunMode::MEMORY_RANDOMIZATION: bool;

    with_toolchain => InfrastructureMode::TOOLCHAIN: String;
    with_clock => InfrastructureMode::CLOCK: String;
    with_engine_factory => InfrastructureMode::ENGINE_FACTORY: String;
    with_build_configuration => InfrastructureMode::BUILD_CONFIGURATION: String;
    with_arguments => InfrastructureMode::ARGUMENTS: Arguments;

    with_max_relative_error => AccuracyMode::MAX_RELATIVE_ERROR: f64;
    with_max_absolute_error => AccuracyMode::MAX_ABSOLUTE_ERROR: TimeInterval;
    with_min_iteration_time => AccuracyMode::MIN_ITERATION_TIME: TimeInterval;
    with_min_invoke_count => AccuracyMode::MIN_INVOKE_COUNT: u32;
    with_evaluate_overhead => AccuracyMode::EVALUATE_OVERHEAD: bool;
    with_outlier_mode => AccuracyMode::OUTLIER_MODE: OutlierMode;
    with_analyze_launch_variance => AccuracyMode::ANALYZE_LAUNCH_VARIANCE: bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn test_with_keeps_receiver_untouched() {
        let base = presets::job::DEFAULT.to_mode();
        let changed = base.with_launch_count(2).unwrap();
        assert_eq!(changed.run().launch_count(), 2);
        assert!(!base.has_value(&RunMode::LAUNCH_COUNT));
        assert!(!changed.is_frozen());
    }

    #[test]
    fn test_custom_id_is_preserved() {
        let job = presets::job::DEFAULT.with_id("theId").unwrap();
        assert_eq!(job.id(), Some("theId"));
        let baseline = job.as_baseline().unwrap();
        assert_eq!(baseline.id(), Some("theId"));
        assert!(baseline.is_baseline());
    }

    #[test]
    fn test_chained_builders() {
        let job = presets::job::DEFAULT
            .with_id("NewId")
            .unwrap()
            .with_platform(Platform::X64)
            .unwrap()
            .with_launch_count(2)
            .unwrap();
        assert_eq!(job.display_info(), "NewId(Platform=X64, LaunchCount=2)");
    }

    #[test]
    fn test_preset_copy_keeps_preset_id() {
        let job = presets::job::SHORT_RUN.with_jit(Jit::RyuJit).unwrap();
        assert_eq!(job.id(), Some("ShortRun"));
        assert_eq!(job.environment().jit(), Jit::RyuJit);
        assert_eq!(job.run().iteration_count(), 3);
    }

    #[test]
    fn test_run_once_per_iteration() {
        let job = presets::job::DEFAULT.run_once_per_iteration().unwrap();
        assert_eq!(job.presentation(), "InvocationCount=1, UnrollFactor=1");
    }

    #[test]
    fn test_environment_variable_accumulates() {
        let job = presets::job::DEFAULT
            .with_environment_variable("A", "1")
            .unwrap()
            .with_environment_variable("B", "2")
            .unwrap();
        let variables = job.environment().environment_variables();
        assert_eq!(variables.get("A"), Some("1"));
        assert_eq!(variables.get("B"), Some("2"));
    }

    #[test]
    fn test_argument_accumulates() {
        let job = presets::job::DEFAULT
            .with_argument("--one")
            .unwrap()
            .with_argument("--two")
            .unwrap();
        assert_eq!(job.infrastructure().arguments().to_string(), "--one --two");
    }

    #[test]
    fn test_as_mutator_survives_further_builders() {
        let mutator = presets::job::DEFAULT
            .as_mutator()
            .unwrap()
            .with_warmup_count(2)
            .unwrap();
        assert!(mutator.is_mutator());
        assert_eq!(mutator.run().warmup_count(), 2);
    }

    #[test]
    fn test_with_gc() {
        let mut gc = GcMode::new();
        gc.set_server(true).unwrap();
        let job = presets::job::DEFAULT.with_gc(&gc).unwrap();
        assert!(job.environment().gc().server());
    }
}
