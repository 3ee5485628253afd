//! Meta mode: the role a job plays when jobs are combined

use benchjob_traits::{Schema, declare_mode, define_traits};
use std::sync::LazyLock;

static META_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| MetaMode::register_traits(Schema::builder("Meta")).register());

declare_mode! {
    /// Baseline and mutator flags
    pub struct MetaMode => &META_SCHEMA;
}

define_traits! {
    MetaMode {
        /// Results of other jobs are reported relative to this one
        BASELINE("Baseline"): bool = false => baseline, set_baseline;
        /// Applied onto every other job instead of running on its own.
        /// Never copied by `apply`.
        IS_MUTATOR("IsMutator", ignore_on_merge): bool = false => is_mutator, set_is_mutator;
        /// Runs only when no other job is configured
        IS_DEFAULT("IsDefault"): bool = false => is_default, set_is_default;
    }
}
