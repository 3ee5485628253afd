//! Folding configured jobs into the set that actually runs
//!
//! Mutators never run on their own. Every explicit trait they carry is laid
//! over each standard job, in the order the mutators were configured. Custom
//! default jobs only run when nothing else is configured.

use crate::job::Job;
use crate::meta::MetaMode;
use benchjob_traits::{Frozen, Mode, Result, TraitComparer};

/// Combines configured jobs into runnable ones
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine {
    comparer: TraitComparer,
}

impl MergeEngine {
    /// Engine that detects duplicate jobs with `comparer`
    pub const fn new(comparer: TraitComparer) -> Self {
        Self { comparer }
    }

    /// Comparer used for duplicate detection
    pub fn comparer(&self) -> TraitComparer {
        self.comparer
    }

    /// Frozen jobs to run, in the order their standard jobs were given.
    ///
    /// Duplicates are dropped first. Each result keeps the explicit id of its
    /// standard job; mutator ids never carry over.
    pub fn runnable_jobs(&self, jobs: &[Job]) -> Result<Vec<Frozen<Job>>> {
        let fresh = Job::new();
        let all: Vec<&Job> = jobs.iter().collect();
        let unique = self.comparer.dedup(all)?;
        if unique.len() < jobs.len() {
            tracing::debug!(dropped = jobs.len() - unique.len(), "dropped duplicate jobs");
        }

        let (mutators, others): (Vec<&Job>, Vec<&Job>) =
            unique.into_iter().partition(|job| job.is_mutator());
        let (defaults, mut standard): (Vec<&Job>, Vec<&Job>) =
            others.into_iter().partition(|job| job.is_default());

        if standard.is_empty() {
            if defaults.len() > 1 {
                tracing::warn!(
                    count = defaults.len(),
                    chosen = %defaults[0].display_info(),
                    "several custom default jobs configured; using the first"
                );
            }
            match defaults.first().copied() {
                Some(default) => standard.push(default),
                None => standard.push(&fresh),
            }
        }

        tracing::debug!(
            standard = standard.len(),
            mutators = mutators.len(),
            "merging jobs"
        );

        standard
            .into_iter()
            .map(|job| -> Result<Frozen<Job>> {
                let mut merged = job.unfreeze_copy();
                if let Some(id) = job.id() {
                    merged.set_id(id)?;
                }
                for mutator in &mutators {
                    merged.apply_traits(*mutator)?;
                }
                MetaMode::IS_DEFAULT.clear(&mut merged)?;
                tracing::trace!(job = %merged.display_info(), "runnable job");
                Ok(merged.into_frozen())
            })
            .collect()
    }
}

/// [`MergeEngine::runnable_jobs`] with ordinal duplicate detection
pub fn runnable_jobs(jobs: &[Job]) -> Result<Vec<Frozen<Job>>> {
    MergeEngine::default().runnable_jobs(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use crate::run::RunMode;
    use crate::values::Platform;

    fn mutator_with_warmup(count: u32) -> Job {
        presets::job::DEFAULT
            .as_mutator()
            .unwrap()
            .with_warmup_count(count)
            .unwrap()
    }

    #[test]
    fn test_mutator_applies_to_standard_job() {
        let standard = presets::job::DEFAULT.with_platform(Platform::X64).unwrap();
        let mutator = mutator_with_warmup(2);

        let runnable = runnable_jobs(&[standard, mutator]).unwrap();
        assert_eq!(runnable.len(), 1);
        let job = &runnable[0];
        assert_eq!(job.environment().platform(), Platform::X64);
        assert_eq!(job.run().warmup_count(), 2);
        assert!(!job.is_mutator());
        assert!(job.is_frozen());
        assert_eq!(job.presentation(), "Platform=X64, WarmupCount=2");
    }

    #[test]
    fn test_mutator_alone_yields_default_job() {
        let runnable = runnable_jobs(&[mutator_with_warmup(2)]).unwrap();
        assert_eq!(runnable.len(), 1);
        assert_eq!(runnable[0].run().warmup_count(), 2);
        assert!(!runnable[0].is_mutator());
        assert_eq!(runnable[0].id(), None);
    }

    #[test]
    fn test_nothing_configured_yields_default_job() {
        let runnable = runnable_jobs(&[]).unwrap();
        assert_eq!(runnable.len(), 1);
        assert_eq!(runnable[0].resolved_id(), "DefaultJob");
    }

    #[test]
    fn test_custom_default_used_only_without_standard_jobs() {
        let custom_default = presets::job::DEFAULT
            .with_launch_count(7)
            .unwrap()
            .as_default(true)
            .unwrap();

        let runnable = runnable_jobs(&[custom_default.clone()]).unwrap();
        assert_eq!(runnable.len(), 1);
        assert_eq!(runnable[0].run().launch_count(), 7);
        assert!(!runnable[0].is_default());
        assert!(!runnable[0].has_value(&MetaMode::IS_DEFAULT));

        let standard = presets::job::SHORT_RUN.to_mode();
        let runnable = runnable_jobs(&[custom_default, standard]).unwrap();
        assert_eq!(runnable.len(), 1);
        assert_eq!(runnable[0].id(), Some("ShortRun"));
    }

    #[test]
    fn test_mutators_apply_in_order_and_keep_ids() {
        let first = presets::job::SHORT_RUN.to_mode();
        let second = presets::job::DEFAULT.with_id("Second").unwrap().with_launch_count(5).unwrap();
        let late = mutator_with_warmup(4).with_id("Mutator").unwrap();
        let later = mutator_with_warmup(9);

        let runnable = runnable_jobs(&[first, second, late, later]).unwrap();
        let ids: Vec<_> = runnable.iter().map(|job| job.resolved_id()).collect();
        assert_eq!(ids, ["ShortRun", "Second"]);
        assert!(runnable.iter().all(|job| job.run().warmup_count() == 9));
        assert_eq!(runnable[1].run().launch_count(), 5);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let a = presets::job::DEFAULT.with_launch_count(1).unwrap();
        let b = presets::job::DEFAULT.with_launch_count(1).unwrap();
        let runnable = runnable_jobs(&[a, b]).unwrap();
        assert_eq!(runnable.len(), 1);
        assert!(RunMode::LAUNCH_COUNT.has_value(&*runnable[0]));
    }

    #[test]
    fn test_source_jobs_stay_untouched() {
        let standard = presets::job::DEFAULT.with_platform(Platform::X64).unwrap();
        let jobs = [standard, mutator_with_warmup(3)];
        let _ = runnable_jobs(&jobs).unwrap();
        assert!(!jobs[0].has_value(&RunMode::WARMUP_COUNT));
        assert!(!jobs[0].is_frozen());
    }
}
