//! The job: a composite of every mode
//!
//! A [`Job`] owns one container of each mode and nothing else. Its
//! presentation, identity and ordering all come from those nested traits.

use crate::accuracy::AccuracyMode;
use crate::environment::EnvironmentMode;
use crate::infrastructure::InfrastructureMode;
use crate::meta::MetaMode;
use crate::run::RunMode;
use benchjob_traits::{Mode, NestedDescriptor, Result, Schema, TraitContainer, declare_mode};
use std::sync::LazyLock;

static JOB_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("Job")
        .nested(&Job::ENVIRONMENT)
        .nested(&Job::RUN)
        .nested(&Job::INFRASTRUCTURE)
        .nested(&Job::ACCURACY)
        .nested(&Job::META)
        .register()
});

declare_mode! {
    /// A complete benchmark configuration
    pub struct Job => &JOB_SCHEMA;
}

impl Job {
    /// Environment mode
    pub const ENVIRONMENT: NestedDescriptor<Job, EnvironmentMode> =
        NestedDescriptor::declare("Environment");
    /// Run mode
    pub const RUN: NestedDescriptor<Job, RunMode> = NestedDescriptor::declare("Run");
    /// Infrastructure mode
    pub const INFRASTRUCTURE: NestedDescriptor<Job, InfrastructureMode> =
        NestedDescriptor::declare("Infrastructure");
    /// Accuracy mode
    pub const ACCURACY: NestedDescriptor<Job, AccuracyMode> = NestedDescriptor::declare("Accuracy");
    /// Meta mode
    pub const META: NestedDescriptor<Job, MetaMode> = NestedDescriptor::declare("Meta");

    /// Build a job from `sources`, applied in order.
    ///
    /// Only `id` names the result; ids carried by the sources are ignored.
    pub fn compose<'a, I>(id: Option<&str>, sources: I) -> Result<Job>
    where
        I: IntoIterator<Item = &'a TraitContainer>,
    {
        let mut job = Job::new();
        if let Some(id) = id {
            job.set_id(id)?;
        }
        for source in sources {
            job.apply_traits(source)?;
        }
        Ok(job)
    }

    /// Empty job with an explicit id
    pub fn named(id: &str) -> Result<Job> {
        let mut job = Job::new();
        job.set_id(id)?;
        Ok(job)
    }

    /// Environment mode
    pub fn environment(&self) -> &EnvironmentMode {
        Self::ENVIRONMENT.get(self)
    }

    /// Environment mode, for modification
    pub fn environment_mut(&mut self) -> Result<&mut EnvironmentMode> {
        Self::ENVIRONMENT.get_mut(self)
    }

    /// Run mode
    pub fn run(&self) -> &RunMode {
        Self::RUN.get(self)
    }

    /// Run mode, for modification
    pub fn run_mut(&mut self) -> Result<&mut RunMode> {
        Self::RUN.get_mut(self)
    }

    /// Infrastructure mode
    pub fn infrastructure(&self) -> &InfrastructureMode {
        Self::INFRASTRUCTURE.get(self)
    }

    /// Infrastructure mode, for modification
    pub fn infrastructure_mut(&mut self) -> Result<&mut InfrastructureMode> {
        Self::INFRASTRUCTURE.get_mut(self)
    }

    /// Accuracy mode
    pub fn accuracy(&self) -> &AccuracyMode {
        Self::ACCURACY.get(self)
    }

    /// Accuracy mode, for modification
    pub fn accuracy_mut(&mut self) -> Result<&mut AccuracyMode> {
        Self::ACCURACY.get_mut(self)
    }

    /// Meta mode
    pub fn meta(&self) -> &MetaMode {
        Self::META.get(self)
    }

    /// Meta mode, for modification
    pub fn meta_mut(&mut self) -> Result<&mut MetaMode> {
        Self::META.get_mut(self)
    }

    /// Resolved id followed by the presentation in parentheses, if any
    pub fn display_info(&self) -> String {
        let id = self.resolved_id();
        let presentation = self.presentation();
        if presentation.is_empty() {
            id
        } else {
            format!("{id}({presentation})")
        }
    }

    /// Name of the artifact folder for this job
    pub fn folder_info(&self) -> String {
        self.resolved_id()
    }

    /// Whether the job is applied onto others instead of running alone
    pub fn is_mutator(&self) -> bool {
        self.meta().is_mutator()
    }

    /// Whether the job only runs when nothing else is configured
    pub fn is_default(&self) -> bool {
        self.meta().is_default()
    }

    /// Whether the job is the baseline
    pub fn is_baseline(&self) -> bool {
        self.meta().baseline()
    }
}
