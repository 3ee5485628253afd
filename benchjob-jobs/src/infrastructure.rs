//! Infrastructure mode: toolchain, clock and build settings

use crate::values::Arguments;
use benchjob_traits::{Schema, declare_mode, define_traits};
use std::sync::LazyLock;

static INFRASTRUCTURE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    InfrastructureMode::register_traits(Schema::builder("Infrastructure")).register()
});

/// Toolchain name that runs benchmarks inside the host process
pub const IN_PROCESS_TOOLCHAIN: &str = "InProcess";

declare_mode! {
    /// How the benchmark is built and launched. Component names are opaque
    /// to the job model; an empty name means the host default.
    pub struct InfrastructureMode => &INFRASTRUCTURE_SCHEMA;
}

define_traits! {
    InfrastructureMode {
        /// Toolchain that builds and runs the benchmark
        TOOLCHAIN("Toolchain"): String = String::new() => toolchain, set_toolchain;
        /// Clock used for measurements
        CLOCK("Clock"): String = String::new() => clock, set_clock;
        /// Engine factory
        ENGINE_FACTORY("EngineFactory"): String = String::new() => engine_factory, set_engine_factory;
        /// Build configuration
        BUILD_CONFIGURATION("BuildConfiguration"): String = String::from("Release")
            => build_configuration, set_build_configuration;
        /// Extra arguments for the benchmark process
        ARGUMENTS("Arguments"): Arguments = Arguments::new() => arguments, set_arguments;
    }
}
