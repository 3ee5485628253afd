//! Environment and garbage collector modes

use crate::values::{Affinity, EnvironmentVariables, Jit, Platform, PowerPlan, Runtime};
use benchjob_traits::{NestedDescriptor, Result, Schema, declare_mode, define_traits};
use std::sync::LazyLock;

static GC_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| GcMode::register_traits(Schema::builder("Gc")).register());

static ENVIRONMENT_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    EnvironmentMode::register_traits(Schema::builder("Environment"))
        .nested(&EnvironmentMode::GC)
        .register()
});

declare_mode! {
    /// Garbage collector settings of the benchmark process
    pub struct GcMode => &GC_SCHEMA;
}

define_traits! {
    GcMode {
        /// Use the server collector
        SERVER("Server"): bool = false => server, set_server;
        /// Collect concurrently on a background thread
        CONCURRENT("Concurrent"): bool = false => concurrent, set_concurrent;
        /// Spread collector threads across CPU groups
        CPU_GROUPS("CpuGroups"): bool = false => cpu_groups, set_cpu_groups;
        /// Force a full collection between iterations
        FORCE("Force"): bool = true => force, set_force;
        /// Allow arrays larger than 2 GB
        ALLOW_VERY_LARGE_OBJECTS("AllowVeryLargeObjects"): bool = false
            => allow_very_large_objects, set_allow_very_large_objects;
        /// Keep freed segments reserved instead of releasing them
        RETAIN_VM("RetainVm"): bool = false => retain_vm, set_retain_vm;
        /// Do not pin collector threads to processors
        NO_AFFINITIZE("NoAffinitize"): bool = false => no_affinitize, set_no_affinitize;
        /// Processors the collector heaps are bound to
        HEAP_AFFINITIZE_MASK("HeapAffinitizeMask"): Affinity = Affinity::default()
            => heap_affinitize_mask, set_heap_affinitize_mask;
        /// Number of collector heaps; 0 lets the runtime decide
        HEAP_COUNT("HeapCount"): u32 = 0 => heap_count, set_heap_count;
    }
}

declare_mode! {
    /// Where the benchmark runs: architecture, runtime, code generator and
    /// process environment
    pub struct EnvironmentMode => &ENVIRONMENT_SCHEMA;
}

define_traits! {
    EnvironmentMode {
        /// Processors the benchmark process may run on
        AFFINITY("Affinity"): Affinity = Affinity::default() => affinity, set_affinity;
        /// Code generator
        JIT("Jit"): Jit = Jit::Default => jit, set_jit;
        /// Target architecture
        PLATFORM("Platform"): Platform = Platform::AnyCpu => platform, set_platform;
        /// Power plan held while benchmarking
        POWER_PLAN("PowerPlan"): PowerPlan = PowerPlan::HighPerformance => power_plan, set_power_plan;
        /// Runtime
        RUNTIME("Runtime"): Runtime = Runtime::Host => runtime, set_runtime;
        /// Extra environment variables
        ENVIRONMENT_VARIABLES("EnvironmentVariables"): EnvironmentVariables = EnvironmentVariables::new()
            => environment_variables, set_environment_variables;
    }
}

impl EnvironmentMode {
    /// Garbage collector settings
    pub const GC: NestedDescriptor<EnvironmentMode, GcMode> = NestedDescriptor::declare("Gc");

    /// Garbage collector settings
    pub fn gc(&self) -> &GcMode {
        Self::GC.get(self)
    }

    /// Garbage collector settings, for modification
    pub fn gc_mut(&mut self) -> Result<&mut GcMode> {
        Self::GC.get_mut(self)
    }
}
