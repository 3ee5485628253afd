//! Job configuration loading from benchjob.toml
//!
//! Jobs can be declared in a `benchjob.toml` file in the project root. The
//! file is discovered by walking up from the current directory.
//!
//! ```toml
//! [order]
//! policy = "numeric"
//!
//! [[job]]
//! id = "Fast"
//! preset = "short"
//! run = { warmup_count = 2 }
//! environment = { platform = "x64" }
//! ```

use anyhow::Context;
use benchjob_jobs::{
    AccuracyMode, Affinity, Arguments, EnvironmentMode, EnvironmentVariables, GcMode,
    InfrastructureMode, Jit, Job, MetaMode, OutlierMode, Platform, PowerPlan, RunMode,
    RunStrategy, Runtime, TimeInterval, presets,
};
use benchjob_traits::{Mode, OrderPolicy};
use serde::Deserialize;
use std::path::Path;

/// File name looked for by [`FileConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "benchjob.toml";

/// Sets every present option onto a job through its trait descriptor.
macro_rules! set_present {
    ($job:expr; $($field:expr => $descriptor:expr),* $(,)?) => {
        $(
            if let Some(value) = $field.clone() {
                $descriptor.set(&mut *$job, value)?;
            }
        )*
    };
}

/// Contents of a benchjob.toml file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    /// Ordering of the planned jobs
    #[serde(default)]
    pub order: OrderConfig,
    /// Declared jobs, in file order
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobConfig>,
}

/// Ordering configuration
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct OrderConfig {
    /// How presentation text is compared
    #[serde(default)]
    pub policy: OrderSetting,
}

/// Ordering policy as written in config files and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderSetting {
    /// Byte-wise ordering
    #[default]
    Ordinal,
    /// Digit runs compare by value
    Numeric,
}

impl From<OrderSetting> for OrderPolicy {
    fn from(setting: OrderSetting) -> Self {
        match setting {
            OrderSetting::Ordinal => OrderPolicy::Ordinal,
            OrderSetting::Numeric => OrderPolicy::Numeric,
        }
    }
}

/// One `[[job]]` entry
#[derive(Debug, Clone, Deserialize, Default)]
pub struct JobConfig {
    /// Explicit job id
    #[serde(default)]
    pub id: Option<String>,
    /// Preset the job starts from (`short`, `MediumRun`, `RyuJitX64`, ...)
    #[serde(default)]
    pub preset: Option<String>,
    /// Apply this job's traits to every other job instead of running it
    #[serde(default)]
    pub mutator: bool,
    /// Run this job only when no standard job is configured
    #[serde(default, rename = "default")]
    pub is_default: bool,
    /// Mark as the baseline
    #[serde(default)]
    pub baseline: bool,
    /// Run settings
    #[serde(default)]
    pub run: RunConfig,
    /// Environment settings
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Accuracy settings
    #[serde(default)]
    pub accuracy: AccuracyConfig,
    /// Infrastructure settings
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,
}

/// `run` table of a job
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    /// Measurement strategy
    pub strategy: Option<RunStrategy>,
    /// Process launches
    pub launch_count: Option<u32>,
    /// Warmup iterations
    pub warmup_count: Option<u32>,
    /// Measured iterations
    pub iteration_count: Option<u32>,
    /// Target iteration time (e.g. "250ms")
    pub iteration_time: Option<TimeInterval>,
    /// Invocations per iteration
    pub invocation_count: Option<u64>,
    /// Unroll factor
    pub unroll_factor: Option<u32>,
    /// Lower bound on automatic iteration counts
    pub min_iteration_count: Option<u32>,
    /// Upper bound on automatic iteration counts
    pub max_iteration_count: Option<u32>,
    /// Lower bound on automatic warmup counts
    pub min_warmup_count: Option<u32>,
    /// Upper bound on automatic warmup counts
    pub max_warmup_count: Option<u32>,
    /// Randomize memory between iterations
    pub memory_randomization: Option<bool>,
}

impl RunConfig {
    fn apply(&self, job: &mut Job) -> benchjob_traits::Result<()> {
        set_present!(job;
            self.strategy => RunMode::RUN_STRATEGY,
            self.launch_count => RunMode::LAUNCH_COUNT,
            self.warmup_count => RunMode::WARMUP_COUNT,
            self.iteration_count => RunMode::ITERATION_COUNT,
            self.iteration_time => RunMode::ITERATION_TIME,
            self.invocation_count => RunMode::INVOCATION_COUNT,
            self.unroll_factor => RunMode::UNROLL_FACTOR,
            self.min_iteration_count => RunMode::MIN_ITERATION_COUNT,
            self.max_iteration_count => RunMode::MAX_ITERATION_COUNT,
            self.min_warmup_count => RunMode::MIN_WARMUP_ITERATION_COUNT,
            self.max_warmup_count => RunMode::MAX_WARMUP_ITERATION_COUNT,
            self.memory_randomization => RunMode::MEMORY_RANDOMIZATION,
        );
        Ok(())
    }
}

/// `environment` table of a job
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Target platform
    pub platform: Option<Platform>,
    /// Code generator
    pub jit: Option<Jit>,
    /// Runtime
    pub runtime: Option<Runtime>,
    /// Power plan
    pub power_plan: Option<PowerPlan>,
    /// Processor affinity mask (`0xF` or `15`)
    pub affinity: Option<Affinity>,
    /// Environment variables for the benchmark process
    pub variables: Option<EnvironmentVariables>,
    /// Garbage collector settings
    pub gc: GcConfig,
}

impl EnvironmentConfig {
    fn apply(&self, job: &mut Job) -> benchjob_traits::Result<()> {
        set_present!(job;
            self.platform => EnvironmentMode::PLATFORM,
            self.jit => EnvironmentMode::JIT,
            self.runtime => EnvironmentMode::RUNTIME,
            self.power_plan => EnvironmentMode::POWER_PLAN,
            self.affinity => EnvironmentMode::AFFINITY,
            self.variables => EnvironmentMode::ENVIRONMENT_VARIABLES,
        );
        self.gc.apply(job)
    }
}

/// `environment.gc` table of a job
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
#[allow(missing_docs)]
pub struct GcConfig {
    pub server: Option<bool>,
    pub concurrent: Option<bool>,
    pub cpu_groups: Option<bool>,
    pub force: Option<bool>,
    pub allow_very_large_objects: Option<bool>,
    pub retain_vm: Option<bool>,
    pub no_affinitize: Option<bool>,
    pub heap_affinitize_mask: Option<Affinity>,
    pub heap_count: Option<u32>,
}

impl GcConfig {
    fn apply(&self, job: &mut Job) -> benchjob_traits::Result<()> {
        set_present!(job;
            self.server => GcMode::SERVER,
            self.concurrent => GcMode::CONCURRENT,
            self.cpu_groups => GcMode::CPU_GROUPS,
            self.force => GcMode::FORCE,
            self.allow_very_large_objects => GcMode::ALLOW_VERY_LARGE_OBJECTS,
            self.retain_vm => GcMode::RETAIN_VM,
            self.no_affinitize => GcMode::NO_AFFINITIZE,
            self.heap_affinitize_mask => GcMode::HEAP_AFFINITIZE_MASK,
            self.heap_count => GcMode::HEAP_COUNT,
        );
        Ok(())
    }
}

/// `accuracy` table of a job
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AccuracyConfig {
    /// Relative error target (0.02 = 2%)
    pub max_relative_error: Option<f64>,
    /// Absolute error target
    pub max_absolute_error: Option<TimeInterval>,
    /// Minimum iteration time
    pub min_iteration_time: Option<TimeInterval>,
    /// Minimum invocations per iteration
    pub min_invoke_count: Option<u32>,
    /// Measure and subtract the harness overhead
    pub evaluate_overhead: Option<bool>,
    /// Which outliers to drop
    pub outlier_mode: Option<OutlierMode>,
    /// Report variance between launches
    pub analyze_launch_variance: Option<bool>,
}

impl AccuracyConfig {
    fn apply(&self, job: &mut Job) -> benchjob_traits::Result<()> {
        set_present!(job;
            self.max_relative_error => AccuracyMode::MAX_RELATIVE_ERROR,
            self.max_absolute_error => AccuracyMode::MAX_ABSOLUTE_ERROR,
            self.min_iteration_time => AccuracyMode::MIN_ITERATION_TIME,
            self.min_invoke_count => AccuracyMode::MIN_INVOKE_COUNT,
            self.evaluate_overhead => AccuracyMode::EVALUATE_OVERHEAD,
            self.outlier_mode => AccuracyMode::OUTLIER_MODE,
            self.analyze_launch_variance => AccuracyMode::ANALYZE_LAUNCH_VARIANCE,
        );
        Ok(())
    }
}

/// `infrastructure` table of a job
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct InfrastructureConfig {
    /// Toolchain name (`InProcess` runs inside the host)
    pub toolchain: Option<String>,
    /// Clock name
    pub clock: Option<String>,
    /// Engine factory name
    pub engine_factory: Option<String>,
    /// Build configuration
    pub build_configuration: Option<String>,
    /// Extra process arguments
    pub arguments: Option<Arguments>,
}

impl InfrastructureConfig {
    fn apply(&self, job: &mut Job) -> benchjob_traits::Result<()> {
        set_present!(job;
            self.toolchain => InfrastructureMode::TOOLCHAIN,
            self.clock => InfrastructureMode::CLOCK,
            self.engine_factory => InfrastructureMode::ENGINE_FACTORY,
            self.build_configuration => InfrastructureMode::BUILD_CONFIGURATION,
            self.arguments => InfrastructureMode::ARGUMENTS,
        );
        Ok(())
    }
}

impl JobConfig {
    /// Build the job this entry describes.
    ///
    /// The preset comes first, then the tables, then `id` and the meta flags.
    /// A preset's id survives unless `id` replaces it.
    pub fn to_job(&self) -> anyhow::Result<Job> {
        let mut job = match &self.preset {
            Some(name) => {
                let preset = presets::job::by_name(name)
                    .with_context(|| format!("unknown preset `{name}`"))?;
                let mut job = preset.unfreeze_copy();
                if let Some(id) = preset.id() {
                    job.set_id(id)?;
                }
                job
            }
            None => Job::new(),
        };

        self.run.apply(&mut job)?;
        self.environment.apply(&mut job)?;
        self.accuracy.apply(&mut job)?;
        self.infrastructure.apply(&mut job)?;

        if let Some(id) = &self.id {
            job.set_id(id)?;
        }
        if self.mutator {
            MetaMode::IS_MUTATOR.set(&mut job, true)?;
        }
        if self.is_default {
            MetaMode::IS_DEFAULT.set(&mut job, true)?;
        }
        if self.baseline {
            MetaMode::BASELINE.set(&mut job, true)?;
        }
        Ok(job)
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!(path = %path.display(), jobs = config.jobs.len(), "loaded job configuration");
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(error) => {
                        tracing::warn!("ignoring {}: {error:#}", config_path.display());
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Jobs declared in the file, in file order
    pub fn to_jobs(&self) -> anyhow::Result<Vec<Job>> {
        self.jobs
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .to_job()
                    .with_context(|| format!("job #{} in {CONFIG_FILE_NAME}", index + 1))
            })
            .collect()
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# benchjob configuration

[order]
# How planned jobs are ordered: "ordinal" or "numeric"
policy = "ordinal"

# Each [[job]] declares one job. Start from a preset (uncomment to enable):
# preset = "short"  # dry, short, medium, long, verylong, inprocess, ryujitx64, ...
[[job]]
id = "Quick"
# Mark as the baseline
baseline = true

[job.run]
launch_count = 1
warmup_count = 3
iteration_count = 5
# iteration_time = "250ms"

[job.environment]
# platform = "x64"
# jit = "ryujit"
# variables = { RUST_BACKTRACE = "1" }

[job.accuracy]
# max_relative_error = 0.02
# outlier_mode = "removeupper"

# A mutator is never run on its own; its traits are applied to every other job.
# [[job]]
# mutator = true
# run = { memory_randomization = true }
"#
        .to_string()
    }
}
