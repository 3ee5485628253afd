#![warn(missing_docs)]
//! Benchjob CLI Library
//!
//! This module provides the command-line front end for benchmark job
//! configuration: it loads `benchjob.toml`, layers command-line overrides on
//! top, and prints the jobs that would run.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     benchjob_cli::run()
//! }
//! ```

mod config;
mod planner;

pub use config::*;
pub use planner::{JobPlan, build_plan};

use anyhow::Context;
use benchjob_jobs::{
    Affinity, Jit, Job, OutlierMode, Platform, RunStrategy, Runtime, TimeInterval, presets,
};
use benchjob_traits::{Mode, OrderPolicy, generate_id};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Benchjob CLI arguments
#[derive(Parser, Debug)]
#[command(name = "benchjob")]
#[command(author, version, about = "benchjob - hierarchical benchmark job configuration")]
pub struct Cli {
    /// Optional subcommand (Plan, Presets, Id, Init); defaults to Plan
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (discovered from the current directory if not specified)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Start the command-line job from a preset (short, medium, dry, ...)
    #[arg(long, global = true)]
    pub job: Option<String>,

    /// Run strategy: throughput, coldstart, monitoring
    #[arg(long)]
    pub strategy: Option<RunStrategy>,

    /// Process launches
    #[arg(long)]
    pub launch_count: Option<u32>,

    /// Warmup iterations
    #[arg(long)]
    pub warmup_count: Option<u32>,

    /// Measured iterations
    #[arg(long)]
    pub iteration_count: Option<u32>,

    /// Target iteration time (e.g. 250ms)
    #[arg(long)]
    pub iteration_time: Option<TimeInterval>,

    /// Invocations per iteration
    #[arg(long)]
    pub invocation_count: Option<u64>,

    /// Unroll factor
    #[arg(long)]
    pub unroll_factor: Option<u32>,

    /// Lower bound on measured iterations
    #[arg(long)]
    pub min_iteration_count: Option<u32>,

    /// Upper bound on measured iterations
    #[arg(long)]
    pub max_iteration_count: Option<u32>,

    /// Lower bound on warmup iterations
    #[arg(long)]
    pub min_warmup_count: Option<u32>,

    /// Upper bound on warmup iterations
    #[arg(long)]
    pub max_warmup_count: Option<u32>,

    /// Invoke the benchmark once per iteration (invocation count and unroll factor 1)
    #[arg(long)]
    pub run_once_per_iteration: bool,

    /// Randomize memory between iterations
    #[arg(long)]
    pub memory_randomization: bool,

    /// Target platform: anycpu, x86, x64, arm, arm64
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Code generator
    #[arg(long)]
    pub jit: Option<Jit>,

    /// Runtime
    #[arg(long)]
    pub runtime: Option<Runtime>,

    /// Processor affinity mask (0xF or 15)
    #[arg(long)]
    pub affinity: Option<Affinity>,

    /// Environment variable for the benchmark process (KEY=VALUE, repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env_vars: Vec<String>,

    /// Relative error target (0.02 = 2%)
    #[arg(long)]
    pub max_relative_error: Option<f64>,

    /// Outlier handling
    #[arg(long)]
    pub outliers: Option<OutlierMode>,

    /// Toolchain name
    #[arg(long)]
    pub toolchain: Option<String>,

    /// Ordering of planned jobs (overrides benchjob.toml)
    #[arg(long, value_enum, global = true)]
    pub order: Option<OrderSetting>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the jobs that would run (default)
    Plan,
    /// List the job presets
    Presets,
    /// Print the id generated for a presentation string
    Id {
        /// Presentation, e.g. "Platform=X64, LaunchCount=1"
        #[arg(name = "PRESENTATION", default_value = "")]
        presentation: String,
    },
    /// Write a starter benchjob.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Job entry described by the command-line flags
    pub fn job_config(&self) -> anyhow::Result<JobConfig> {
        let mut config = JobConfig {
            preset: self.job.clone(),
            ..JobConfig::default()
        };

        config.run = RunConfig {
            strategy: self.strategy,
            launch_count: self.launch_count,
            warmup_count: self.warmup_count,
            iteration_count: self.iteration_count,
            iteration_time: self.iteration_time,
            invocation_count: self.invocation_count,
            unroll_factor: self.unroll_factor,
            min_iteration_count: self.min_iteration_count,
            max_iteration_count: self.max_iteration_count,
            min_warmup_count: self.min_warmup_count,
            max_warmup_count: self.max_warmup_count,
            memory_randomization: self.memory_randomization.then_some(true),
        };
        if self.run_once_per_iteration {
            config.run.invocation_count = Some(1);
            config.run.unroll_factor = Some(1);
        }

        let mut variables = None;
        for pair in &self.env_vars {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("--env expects KEY=VALUE, got `{pair}`"))?;
            variables = Some(
                variables
                    .unwrap_or_else(benchjob_jobs::EnvironmentVariables::new)
                    .with(key.trim(), value.trim()),
            );
        }
        config.environment = EnvironmentConfig {
            platform: self.platform,
            jit: self.jit,
            runtime: self.runtime,
            affinity: self.affinity,
            variables,
            ..EnvironmentConfig::default()
        };

        config.accuracy = AccuracyConfig {
            max_relative_error: self.max_relative_error,
            outlier_mode: self.outliers,
            ..AccuracyConfig::default()
        };
        config.infrastructure.toolchain = self.toolchain.clone();
        Ok(config)
    }

    /// Job built from the command-line flags. Without flags it is empty.
    pub fn job(&self) -> anyhow::Result<Job> {
        self.job_config()?.to_job()
    }

    /// Job the command line asks for, or `None` when it asks for nothing.
    ///
    /// `--job` picks the starting preset. Without it, the single job declared
    /// with `default = true` in `configured` is the start, falling back to an
    /// empty job. The override flags are applied on top.
    pub fn base_job(&self, configured: &[Job]) -> anyhow::Result<Option<Job>> {
        let mut flags = self.job_config()?;
        let preset = flags.preset.take();
        let overrides = flags.to_job()?;

        let mut base = match preset {
            Some(name) => JobConfig {
                preset: Some(name),
                ..JobConfig::default()
            }
            .to_job()?,
            None if !overrides.has_changes() => return Ok(None),
            None => {
                let mut defaults = configured.iter().filter(|job| job.is_default());
                match (defaults.next(), defaults.next()) {
                    (Some(default), None) => {
                        tracing::debug!(
                            default = %default.resolved_id(),
                            "command-line job starts from the configured default"
                        );
                        default.clone()
                    }
                    _ => Job::new(),
                }
            }
        };
        base.apply_traits(&overrides)?;
        Ok(Some(base))
    }
}

/// Run the benchjob CLI with the process arguments.
/// This is the main entry point for the `benchjob` binary.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the benchjob CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("benchjob=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("benchjob=info")
            .with_writer(std::io::stderr)
            .init();
    }

    match &cli.command {
        Some(Commands::Presets) => list_presets(),
        Some(Commands::Id { presentation }) => {
            println!("{}", generate_id(presentation.trim()));
            Ok(())
        }
        Some(Commands::Init { force }) => init_config(*force),
        Some(Commands::Plan) | None => print_plan(&cli),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FileConfig> {
    match &cli.config {
        Some(path) => FileConfig::load(path),
        None => Ok(FileConfig::discover().unwrap_or_default()),
    }
}

/// Build the plan for the loaded configuration and command-line overrides.
pub fn plan_for(cli: &Cli, config: &FileConfig) -> anyhow::Result<JobPlan> {
    let configured = config.to_jobs()?;
    let command_line = cli.base_job(&configured)?;
    let policy: OrderPolicy = cli.order.unwrap_or(config.order.policy).into();
    let plan =
        build_plan(&configured, command_line.as_ref(), policy).context("planning jobs")?;
    Ok(plan)
}

fn print_plan(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let plan = plan_for(cli, &config)?;

    println!("Benchjob Plan ({:?} order):", plan.policy);
    for job in &plan.jobs {
        let marker = if job.is_baseline() { " [baseline]" } else { "" };
        println!("├── {}{}", job.display_info(), marker);
        println!("│   └── folder: {}", job.folder_info());
    }
    println!("{} jobs planned.", plan.jobs.len());
    Ok(())
}

fn list_presets() -> anyhow::Result<()> {
    println!("Job presets:");
    for (name, preset) in presets::job::NAMED.iter() {
        let preset = std::sync::LazyLock::force(preset);
        let traits = preset.presentation();
        let traits = if traits.is_empty() { "(no traits)" } else { &traits };
        println!("├── {:<14} {}", name, traits);
    }
    println!("{} presets available.", presets::job::NAMED.len());
    Ok(())
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = std::env::current_dir()?.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(&path, FileConfig::default_toml())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
