//! Predefined configurations
//!
//! Every preset is built on first use, frozen, and shared. Take a copy with
//! `unfreeze_copy()` (or any `with_*` builder) before changing it.

use benchjob_traits::{Frozen, Mode, Result};

/// Build and freeze a preset.
///
/// # Panics
///
/// Panics if `configure` fails. Presets are fixed in code and only touch a
/// fresh container, so a failure is a programming error.
fn preset<M: Mode>(id: &str, configure: impl FnOnce(&mut M) -> Result<()>) -> Frozen<M> {
    let mut mode = M::fresh();
    let built = mode.as_mut().set_id(id).and_then(|()| configure(&mut mode));
    if let Err(error) = built {
        panic!("preset {id} is invalid: {error}");
    }
    tracing::debug!(id, traits = %mode.presentation(), "preset built");
    mode.into_frozen()
}

/// Run presets, from a single smoke-test pass to very long runs
pub mod run {
    use super::preset;
    use crate::run::RunMode;
    use crate::values::RunStrategy;
    use benchjob_traits::Frozen;
    use std::sync::LazyLock;

    fn counts(launch: u32, warmup: u32, iterations: u32) -> impl FnOnce(&mut RunMode) -> benchjob_traits::Result<()> {
        move |run| {
            run.set_launch_count(launch)?
                .set_warmup_count(warmup)?
                .set_iteration_count(iterations)?;
            Ok(())
        }
    }

    /// One launch, one warmup, one iteration, cold start. Checks that
    /// benchmarks run at all; the numbers mean nothing.
    pub static DRY: LazyLock<Frozen<RunMode>> = LazyLock::new(|| {
        preset("Dry", |run: &mut RunMode| {
            counts(1, 1, 1)(run)?;
            run.set_run_strategy(RunStrategy::ColdStart)?
                .set_unroll_factor(1)?;
            Ok(())
        })
    });

    /// 1 launch, 3 warmups, 3 iterations
    pub static SHORT: LazyLock<Frozen<RunMode>> = LazyLock::new(|| preset("Short", counts(1, 3, 3)));

    /// 2 launches, 10 warmups, 15 iterations
    pub static MEDIUM: LazyLock<Frozen<RunMode>> =
        LazyLock::new(|| preset("Medium", counts(2, 10, 15)));

    /// 3 launches, 15 warmups, 100 iterations
    pub static LONG: LazyLock<Frozen<RunMode>> = LazyLock::new(|| preset("Long", counts(3, 15, 100)));

    /// 4 launches, 30 warmups, 500 iterations
    pub static VERY_LONG: LazyLock<Frozen<RunMode>> =
        LazyLock::new(|| preset("VeryLong", counts(4, 30, 500)));
}

/// Environment presets pairing a platform with a code generator
pub mod environment {
    use super::preset;
    use crate::environment::EnvironmentMode;
    use crate::values::{Jit, Platform};
    use benchjob_traits::Frozen;
    use std::sync::LazyLock;

    fn target(platform: Platform, jit: Jit) -> impl FnOnce(&mut EnvironmentMode) -> benchjob_traits::Result<()> {
        move |env| {
            env.set_platform(platform)?.set_jit(jit)?;
            Ok(())
        }
    }

    /// Legacy code generator on x86
    pub static LEGACY_JIT_X86: LazyLock<Frozen<EnvironmentMode>> =
        LazyLock::new(|| preset("LegacyJitX86", target(Platform::X86, Jit::LegacyJit)));

    /// Legacy code generator on x64
    pub static LEGACY_JIT_X64: LazyLock<Frozen<EnvironmentMode>> =
        LazyLock::new(|| preset("LegacyJitX64", target(Platform::X64, Jit::LegacyJit)));

    /// Current code generator on x86
    pub static RYU_JIT_X86: LazyLock<Frozen<EnvironmentMode>> =
        LazyLock::new(|| preset("RyuJitX86", target(Platform::X86, Jit::RyuJit)));

    /// Current code generator on x64
    pub static RYU_JIT_X64: LazyLock<Frozen<EnvironmentMode>> =
        LazyLock::new(|| preset("RyuJitX64", target(Platform::X64, Jit::RyuJit)));
}

/// Infrastructure presets
pub mod infrastructure {
    use super::preset;
    use crate::infrastructure::{IN_PROCESS_TOOLCHAIN, InfrastructureMode};
    use benchjob_traits::Frozen;
    use std::sync::LazyLock;

    /// Run benchmarks inside the host process
    pub static IN_PROCESS: LazyLock<Frozen<InfrastructureMode>> = LazyLock::new(|| {
        preset("InProcess", |infra: &mut InfrastructureMode| {
            infra.set_toolchain(IN_PROCESS_TOOLCHAIN.to_string())?;
            Ok(())
        })
    });
}

/// Job presets
pub mod job {
    use super::preset;
    use crate::job::Job;
    use benchjob_traits::{Frozen, Mode, TraitContainer};
    use std::sync::LazyLock;

    fn from(source: &'static TraitContainer) -> impl FnOnce(&mut Job) -> benchjob_traits::Result<()> {
        move |job| {
            job.apply_traits(source)?;
            Ok(())
        }
    }

    /// The empty job. It has no id and presents as `DefaultJob`.
    pub static DEFAULT: LazyLock<Frozen<Job>> = LazyLock::new(|| Job::new().into_frozen());

    /// Dry run
    pub static DRY: LazyLock<Frozen<Job>> =
        LazyLock::new(|| preset("Dry", from((*super::run::DRY).as_ref())));

    /// Short run
    pub static SHORT_RUN: LazyLock<Frozen<Job>> =
        LazyLock::new(|| preset("ShortRun", from((*super::run::SHORT).as_ref())));

    /// Medium run
    pub static MEDIUM_RUN: LazyLock<Frozen<Job>> =
        LazyLock::new(|| preset("MediumRun", from((*super::run::MEDIUM).as_ref())));

    /// Long run
    pub static LONG_RUN: LazyLock<Frozen<Job>> =
        LazyLock::new(|| preset("LongRun", from((*super::run::LONG).as_ref())));

    /// Very long run
    pub static VERY_LONG_RUN: LazyLock<Frozen<Job>> =
        LazyLock::new(|| preset("VeryLongRun", from((*super::run::VERY_LONG).as_ref())));

    /// In-process toolchain
    pub static IN_PROCESS: LazyLock<Frozen<Job>> = LazyLock::new(|| {
        preset("InProcess", from((*super::infrastructure::IN_PROCESS).as_ref()))
    });

    /// Legacy code generator on x86
    pub static LEGACY_JIT_X86: LazyLock<Frozen<Job>> = LazyLock::new(|| {
        preset("LegacyJitX86", from((*super::environment::LEGACY_JIT_X86).as_ref()))
    });

    /// Legacy code generator on x64
    pub static LEGACY_JIT_X64: LazyLock<Frozen<Job>> = LazyLock::new(|| {
        preset("LegacyJitX64", from((*super::environment::LEGACY_JIT_X64).as_ref()))
    });

    /// Current code generator on x86
    pub static RYU_JIT_X86: LazyLock<Frozen<Job>> = LazyLock::new(|| {
        preset("RyuJitX86", from((*super::environment::RYU_JIT_X86).as_ref()))
    });

    /// Current code generator on x64
    pub static RYU_JIT_X64: LazyLock<Frozen<Job>> = LazyLock::new(|| {
        preset("RyuJitX64", from((*super::environment::RYU_JIT_X64).as_ref()))
    });

    /// Every job preset with its lookup name
    pub static NAMED: [(&str, &LazyLock<Frozen<Job>>); 11] = [
        ("Default", &DEFAULT),
        ("Dry", &DRY),
        ("Short", &SHORT_RUN),
        ("Medium", &MEDIUM_RUN),
        ("Long", &LONG_RUN),
        ("VeryLong", &VERY_LONG_RUN),
        ("InProcess", &IN_PROCESS),
        ("LegacyJitX86", &LEGACY_JIT_X86),
        ("LegacyJitX64", &LEGACY_JIT_X64),
        ("RyuJitX86", &RYU_JIT_X86),
        ("RyuJitX64", &RYU_JIT_X64),
    ];

    /// Look up a job preset by name, ignoring case. `ShortRun` and `Short`
    /// name the same preset.
    pub fn by_name(name: &str) -> Option<&'static Frozen<Job>> {
        let name = name.trim();
        let base = match name.len().checked_sub(3) {
            Some(at) if name.is_char_boundary(at) && name[at..].eq_ignore_ascii_case("run") => {
                &name[..at]
            }
            _ => name,
        };
        NAMED
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name) || key.eq_ignore_ascii_case(base))
            .map(|(_, preset)| LazyLock::force(preset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Platform, RunStrategy};

    #[test]
    fn test_run_presets() {
        let dry = &*run::DRY;
        assert!(dry.is_frozen());
        assert_eq!(dry.id(), Some("Dry"));
        assert_eq!(dry.run_strategy(), RunStrategy::ColdStart);
        assert_eq!(dry.unroll_factor(), 1);
        assert_eq!(
            (run::MEDIUM.launch_count(), run::MEDIUM.warmup_count(), run::MEDIUM.iteration_count()),
            (2, 10, 15)
        );
        assert_eq!(run::VERY_LONG.iteration_count(), 500);
    }

    #[test]
    fn test_job_presets_carry_their_mode() {
        assert_eq!(job::SHORT_RUN.id(), Some("ShortRun"));
        assert_eq!(job::SHORT_RUN.presentation(), "LaunchCount=1, WarmupCount=3, IterationCount=3");
        assert_eq!(job::RYU_JIT_X64.environment().platform(), Platform::X64);
        assert_eq!(job::IN_PROCESS.infrastructure().toolchain(), "InProcess");
        assert!(job::DRY.run().is_frozen());
    }

    #[test]
    fn test_default_preset_is_empty() {
        assert_eq!(job::DEFAULT.id(), None);
        assert_eq!(job::DEFAULT.resolved_id(), "DefaultJob");
        assert!(job::DEFAULT.is_frozen());
    }

    #[test]
    fn test_presets_are_shared() {
        let first = job::by_name("short").unwrap();
        let second = job::by_name("ShortRun").unwrap();
        assert!(Frozen::ptr_eq(first, second));
        assert!(Frozen::ptr_eq(first, &job::SHORT_RUN));
        assert!(job::by_name("warp").is_none());
    }

    #[test]
    fn test_presets_stay_frozen() {
        let mut owned = job::DRY.to_mode();
        assert!(owned.run_mut().is_err());
        let mut copy = job::DRY.unfreeze_copy();
        copy.run_mut().unwrap().set_launch_count(5).unwrap();
        assert_eq!(job::DRY.run().launch_count(), 1);
    }
}
