//! Job Planner
//!
//! Builds the plan of jobs to run from configured jobs and the job described
//! on the command line.
//!
//! - A command-line job that is exactly a preset runs as its own job
//! - Any other command-line job becomes a mutator applied to every configured job
//! - Mutators and custom defaults are folded by the merge engine
//!
//! Ordering: Jobs are sorted by trait values for deterministic execution.

use benchjob_jobs::{Job, MergeEngine, presets};
use benchjob_traits::{Frozen, Mode, OrderPolicy, Result, TraitComparer, TraitContainer};
use std::sync::LazyLock;
use tracing::debug;

/// Execution plan for jobs
#[derive(Debug)]
pub struct JobPlan {
    /// Ordered, frozen jobs to run
    pub jobs: Vec<Frozen<Job>>,
    /// Policy the jobs were ordered with
    pub policy: OrderPolicy,
}

/// Build execution plan from configured jobs
///
/// `command_line` is the job described by command-line flags, if any.
pub fn build_plan(
    configured: &[Job],
    command_line: Option<&Job>,
    policy: OrderPolicy,
) -> Result<JobPlan> {
    let comparer = TraitComparer::new(policy);
    let mut jobs = configured.to_vec();
    if let Some(job) = command_line {
        jobs.push(command_line_job(job, &comparer)?);
    }

    let mut runnable = MergeEngine::new(comparer).runnable_jobs(&jobs)?;
    comparer.sort(&mut runnable)?;

    Ok(JobPlan {
        jobs: runnable,
        policy,
    })
}

/// A preset is planned as is; anything else patches the configured jobs.
fn command_line_job(job: &Job, comparer: &TraitComparer) -> Result<Job> {
    for (name, preset) in presets::job::NAMED.iter() {
        let preset: &TraitContainer = LazyLock::force(preset).as_ref();
        if comparer.equivalent(job.as_ref(), preset)? {
            debug!(preset = name, "command-line job is a preset");
            return Ok(job.clone());
        }
    }
    debug!(overrides = %job.presentation(), "applying command-line overrides");
    job.as_default(false)?.as_mutator()
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchjob_jobs::{Platform, presets};

    fn with_count(id: &str, count: u32) -> Job {
        presets::job::DEFAULT
            .with_id(id)
            .unwrap()
            .with_iteration_count(count)
            .unwrap()
    }

    #[test]
    fn test_nothing_configured() {
        let plan = build_plan(&[], None, OrderPolicy::Ordinal).unwrap();
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].resolved_id(), "DefaultJob");
    }

    #[test]
    fn test_overrides_alone() {
        let overrides = Job::new().with_launch_count(3).unwrap();
        let plan = build_plan(&[], Some(&overrides), OrderPolicy::Ordinal).unwrap();
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].run().launch_count(), 3);
        assert!(!plan.jobs[0].is_mutator());
    }

    #[test]
    fn test_overrides_apply_to_every_job() {
        let configured = [with_count("A", 5), with_count("B", 7)];
        let overrides = Job::new().with_platform(Platform::Arm64).unwrap();
        let plan = build_plan(&configured, Some(&overrides), OrderPolicy::Ordinal).unwrap();
        assert_eq!(plan.jobs.len(), 2);
        assert!(
            plan.jobs
                .iter()
                .all(|job| job.environment().platform() == Platform::Arm64)
        );
        assert_eq!(plan.jobs[0].id(), Some("A"));
    }

    #[test]
    fn test_ordering_policy() {
        let configured = [
            Job::new().with_iteration_count(10).unwrap(),
            Job::new().with_iteration_count(9).unwrap(),
        ];
        let counts = |plan: &JobPlan| -> Vec<u32> {
            plan.jobs.iter().map(|job| job.run().iteration_count()).collect()
        };

        let ordinal = build_plan(&configured, None, OrderPolicy::Ordinal).unwrap();
        assert_eq!(counts(&ordinal), [10, 9]);

        let numeric = build_plan(&configured, None, OrderPolicy::Numeric).unwrap();
        assert_eq!(numeric.policy, OrderPolicy::Numeric);
        assert_eq!(counts(&numeric), [9, 10]);
    }

    fn short_run() -> Job {
        let mut job = presets::job::SHORT_RUN.unfreeze_copy();
        job.set_id("ShortRun").unwrap();
        job
    }

    #[test]
    fn test_preset_alone_keeps_its_id() {
        let plan = build_plan(&[], Some(&short_run()), OrderPolicy::Ordinal).unwrap();
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].resolved_id(), "ShortRun");
        assert_eq!(plan.jobs[0].run().iteration_count(), 3);
        assert!(!plan.jobs[0].is_mutator());
    }

    #[test]
    fn test_preset_runs_beside_configured_jobs() {
        let configured = [with_count("A", 4)];
        let plan = build_plan(&configured, Some(&short_run()), OrderPolicy::Ordinal).unwrap();
        assert_eq!(plan.jobs.len(), 2);

        let a = plan.jobs.iter().find(|job| job.id() == Some("A")).unwrap();
        assert_eq!(a.run().iteration_count(), 4);
        assert_eq!(a.run().launch_count(), 0);
        assert!(plan.jobs.iter().any(|job| job.id() == Some("ShortRun")));
    }

    #[test]
    fn test_customized_preset_mutates() {
        let configured = [with_count("A", 4)];
        let custom = short_run().with_platform(Platform::X64).unwrap();
        let plan = build_plan(&configured, Some(&custom), OrderPolicy::Ordinal).unwrap();
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].id(), Some("A"));
        assert_eq!(plan.jobs[0].environment().platform(), Platform::X64);
        assert!(!plan.jobs[0].is_default());
    }

    #[test]
    fn test_custom_default_is_patched() {
        let default = presets::job::DEFAULT
            .with_id("Base")
            .unwrap()
            .with_warmup_count(2)
            .unwrap()
            .as_default(true)
            .unwrap();
        let custom = default.with_launch_count(5).unwrap();
        let plan = build_plan(&[default], Some(&custom), OrderPolicy::Ordinal).unwrap();
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].id(), Some("Base"));
        assert_eq!(plan.jobs[0].run().warmup_count(), 2);
        assert_eq!(plan.jobs[0].run().launch_count(), 5);
        assert!(!plan.jobs[0].is_default());
    }
}
