//! Cross-cutting execution concerns for pipeline runs.
//!
//! This module sits "beside" [`crate::pipeline`] and provides:
//!
//! - Wall-clock timing ([`timed`], used by [`crate::pipeline::Pipeline::run_timed`])
//! - Observer hooks and cumulative metrics for monitoring runs
//! - A retry helper for flaky caller-side work (e.g. loading input)
//!
//! None of this changes what a pipeline computes.

mod observer;
mod retry;

use std::time::{Duration, Instant};

pub use observer::{
    CompositeObserver, MetricsObserver, PipelineEvent, PipelineObserver, RunMetricsSnapshot,
    StdErrObserver, TracingObserver,
};
pub use retry::{RetryPolicy, retry, retry_when};

/// Run `f` and measure its wall-clock duration.
pub fn timed<T, F>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

/// Format a timing line as printed by [`crate::pipeline::Pipeline::run_timed`].
pub fn format_execution_time(label: &str, elapsed: Duration) -> String {
    format!("[EXECUTION TIME] {label}: {:.6}s", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::{format_execution_time, timed};
    use std::time::Duration;

    #[test]
    fn timed_returns_value_and_elapsed() {
        let (v, elapsed) = timed(|| {
            std::thread::sleep(Duration::from_millis(10));
            41 + 1
        });
        assert_eq!(v, 42);
        assert!(elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn execution_time_line_contains_seconds() {
        let line = format_execution_time("pipeline", Duration::from_millis(1500));
        assert_eq!(line, "[EXECUTION TIME] pipeline: 1.500000s");
    }
}
