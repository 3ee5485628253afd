//! Accuracy mode: stopping criteria and outlier handling

use crate::values::{OutlierMode, TimeInterval};
use benchjob_traits::{Schema, declare_mode, define_traits};
use std::sync::LazyLock;

static ACCURACY_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| AccuracyMode::register_traits(Schema::builder("Accuracy")).register());

declare_mode! {
    /// Precision targets for automatically sized runs
    pub struct AccuracyMode => &ACCURACY_SCHEMA;
}

define_traits! {
    AccuracyMode {
        /// Stop once the confidence interval half-width falls below this fraction of the mean
        MAX_RELATIVE_ERROR("MaxRelativeError"): f64 = 0.0 => max_relative_error, set_max_relative_error;
        /// Stop once the confidence interval half-width falls below this duration
        MAX_ABSOLUTE_ERROR("MaxAbsoluteError"): TimeInterval = TimeInterval::ZERO
            => max_absolute_error, set_max_absolute_error;
        /// Shortest acceptable iteration
        MIN_ITERATION_TIME("MinIterationTime"): TimeInterval = TimeInterval::ZERO
            => min_iteration_time, set_min_iteration_time;
        /// Fewest invocations per iteration
        MIN_INVOKE_COUNT("MinInvokeCount"): u32 = 0 => min_invoke_count, set_min_invoke_count;
        /// Measure and subtract the harness overhead
        EVALUATE_OVERHEAD("EvaluateOverhead"): bool = false => evaluate_overhead, set_evaluate_overhead;
        /// Which outliers are dropped
        OUTLIER_MODE("OutlierMode"): OutlierMode = OutlierMode::DontRemove => outlier_mode, set_outlier_mode;
        /// Compare results across launches
        ANALYZE_LAUNCH_VARIANCE("AnalyzeLaunchVariance"): bool = false
            => analyze_launch_variance, set_analyze_launch_variance;
    }
}
