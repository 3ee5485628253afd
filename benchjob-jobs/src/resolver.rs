//! Fallbacks for traits a job leaves unset
//!
//! [`EngineResolver`] fills in what the measurement engine would pick;
//! [`HostResolver`] fills in what the host machine provides.
//! [`standard_resolver`] chains both, engine first.

use crate::accuracy::AccuracyMode;
use crate::environment::EnvironmentMode;
use crate::run::RunMode;
use crate::values::{Affinity, OutlierMode, Platform, Runtime, TimeInterval};
use benchjob_traits::{AnyValue, Mode, Resolver, ResolverChain, TraitContainer, ValueField};

/// Default unroll factor of the measurement loop
pub const DEFAULT_UNROLL_FACTOR: u32 = 16;
/// Default lower bound on automatically chosen iteration counts
pub const DEFAULT_MIN_ITERATION_COUNT: u32 = 15;
/// Default upper bound on automatically chosen iteration counts
pub const DEFAULT_MAX_ITERATION_COUNT: u32 = 100;
/// Default lower bound on automatically chosen warmup counts
pub const DEFAULT_MIN_WARMUP_COUNT: u32 = 6;
/// Default upper bound on automatically chosen warmup counts
pub const DEFAULT_MAX_WARMUP_COUNT: u32 = 50;
/// Default target iteration time
pub const DEFAULT_ITERATION_TIME: TimeInterval = TimeInterval::from_millis(500);
/// Default relative error target
pub const DEFAULT_MAX_RELATIVE_ERROR: f64 = 0.02;
/// Default minimum iteration time
pub const DEFAULT_MIN_ITERATION_TIME: TimeInterval = TimeInterval::from_millis(500);
/// Default minimum invocations per iteration
pub const DEFAULT_MIN_INVOKE_COUNT: u32 = 4;

/// Measurement engine defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineResolver;

impl EngineResolver {
    fn resolve_run(container: &TraitContainer, name: &str) -> Option<AnyValue> {
        let value = match name {
            "LaunchCount" => AnyValue::new(1u32),
            "UnrollFactor" => {
                let single_shot = RunMode::RUN_STRATEGY.get(container).is_single_shot();
                AnyValue::new(if single_shot { 1u32 } else { DEFAULT_UNROLL_FACTOR })
            }
            "IterationTime" => AnyValue::new(DEFAULT_ITERATION_TIME),
            "MinIterationCount" => AnyValue::new(DEFAULT_MIN_ITERATION_COUNT),
            "MaxIterationCount" => AnyValue::new(DEFAULT_MAX_ITERATION_COUNT),
            "MinWarmupIterationCount" => AnyValue::new(DEFAULT_MIN_WARMUP_COUNT),
            "MaxWarmupIterationCount" => AnyValue::new(DEFAULT_MAX_WARMUP_COUNT),
            _ => return None,
        };
        Some(value)
    }

    fn resolve_accuracy(name: &str) -> Option<AnyValue> {
        let value = match name {
            "MaxRelativeError" => AnyValue::new(DEFAULT_MAX_RELATIVE_ERROR),
            "MinIterationTime" => AnyValue::new(DEFAULT_MIN_ITERATION_TIME),
            "MinInvokeCount" => AnyValue::new(DEFAULT_MIN_INVOKE_COUNT),
            "EvaluateOverhead" => AnyValue::new(true),
            "OutlierMode" => AnyValue::new(OutlierMode::RemoveUpper),
            _ => return None,
        };
        Some(value)
    }
}

impl Resolver for EngineResolver {
    fn resolve(&self, container: &TraitContainer, field: &ValueField) -> Option<AnyValue> {
        let schema = container.schema();
        if schema.is(RunMode::schema()) {
            Self::resolve_run(container, field.name())
        } else if schema.is(AccuracyMode::schema()) {
            Self::resolve_accuracy(field.name())
        } else {
            None
        }
    }
}

/// Properties of the machine running the harness
#[derive(Debug, Clone, Copy)]
pub struct HostResolver {
    platform: Platform,
    affinity: Affinity,
}

impl HostResolver {
    /// Resolver for the current host
    pub fn detect() -> Self {
        Self {
            platform: Platform::host(),
            affinity: Affinity::host(),
        }
    }

    /// Resolver for a described host
    pub fn new(platform: Platform, affinity: Affinity) -> Self {
        Self { platform, affinity }
    }
}

impl Resolver for HostResolver {
    fn resolve(&self, container: &TraitContainer, field: &ValueField) -> Option<AnyValue> {
        if !container.schema().is(EnvironmentMode::schema()) {
            return None;
        }
        match field.name() {
            "Platform" => Some(AnyValue::new(self.platform)),
            "Affinity" => Some(AnyValue::new(self.affinity)),
            "Runtime" => Some(AnyValue::new(Runtime::Host)),
            _ => None,
        }
    }
}

/// Engine defaults, then host properties
pub fn standard_resolver() -> ResolverChain {
    ResolverChain::new()
        .with(EngineResolver)
        .with(HostResolver::detect())
}
