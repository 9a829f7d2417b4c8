use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Events emitted by [`crate::pipeline::Pipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RunStarted {
        steps: usize,
        input_rows: usize,
    },
    StepFinished {
        index: usize,
        name: String,
        input_rows: usize,
        output_rows: usize,
        elapsed: Duration,
    },
    RunFinished {
        output_rows: usize,
        elapsed: Duration,
    },
    RunFailed {
        message: String,
        elapsed: Duration,
    },
}

/// Observer hook for pipeline events.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// A simple stderr logger for pipeline events.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { steps, input_rows } => {
                eprintln!("[pipeline][start] steps={steps} rows={input_rows}")
            }
            PipelineEvent::StepFinished {
                index,
                name,
                input_rows,
                output_rows,
                elapsed,
            } => eprintln!(
                "[pipeline][step {index}] {name} rows={input_rows}->{output_rows} elapsed={elapsed:?}"
            ),
            PipelineEvent::RunFinished {
                output_rows,
                elapsed,
            } => eprintln!("[pipeline][ok] rows={output_rows} elapsed={elapsed:?}"),
            PipelineEvent::RunFailed { message, elapsed } => {
                eprintln!("[pipeline][fail] err={message} elapsed={elapsed:?}")
            }
        }
    }
}

/// Forwards pipeline events to `tracing` under the `record_pipeline` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { steps, input_rows } => {
                tracing::info!(target: "record_pipeline", steps, input_rows, "run started")
            }
            PipelineEvent::StepFinished {
                index,
                name,
                input_rows,
                output_rows,
                elapsed,
            } => tracing::debug!(
                target: "record_pipeline",
                index,
                name = name.as_str(),
                input_rows,
                output_rows,
                elapsed_us = elapsed.as_micros() as u64,
                "step finished"
            ),
            PipelineEvent::RunFinished {
                output_rows,
                elapsed,
            } => tracing::info!(
                target: "record_pipeline",
                output_rows,
                elapsed_us = elapsed.as_micros() as u64,
                "run finished"
            ),
            PipelineEvent::RunFailed { message, elapsed } => tracing::error!(
                target: "record_pipeline",
                error = message.as_str(),
                elapsed_us = elapsed.as_micros() as u64,
                "run failed"
            ),
        }
    }
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_event(&self, event: &PipelineEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Cumulative run metrics, updated from pipeline events.
///
/// Attach it as an observer and snapshot it at any time.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    runs_started: AtomicU64,
    runs_finished: AtomicU64,
    runs_failed: AtomicU64,
    steps_finished: AtomicU64,
    rows_in: AtomicU64,
    rows_out: AtomicU64,
    last_elapsed_ns: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RunMetricsSnapshot {
        let last_elapsed_ns = self.last_elapsed_ns.load(Ordering::SeqCst);
        RunMetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::SeqCst),
            runs_finished: self.runs_finished.load(Ordering::SeqCst),
            runs_failed: self.runs_failed.load(Ordering::SeqCst),
            steps_finished: self.steps_finished.load(Ordering::SeqCst),
            rows_in: self.rows_in.load(Ordering::SeqCst),
            rows_out: self.rows_out.load(Ordering::SeqCst),
            last_elapsed: (last_elapsed_ns > 0).then(|| Duration::from_nanos(last_elapsed_ns)),
        }
    }

    fn record_elapsed(&self, elapsed: Duration) {
        // Clamp to at least 1ns so a finished run is distinguishable from "never ran".
        let ns = elapsed.as_nanos().clamp(1, u64::MAX as u128) as u64;
        self.last_elapsed_ns.store(ns, Ordering::SeqCst);
    }
}

impl PipelineObserver for MetricsObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { input_rows, .. } => {
                let _ = self.runs_started.fetch_add(1, Ordering::SeqCst);
                let _ = self.rows_in.fetch_add(*input_rows as u64, Ordering::SeqCst);
            }
            PipelineEvent::StepFinished { .. } => {
                let _ = self.steps_finished.fetch_add(1, Ordering::SeqCst);
            }
            PipelineEvent::RunFinished {
                output_rows,
                elapsed,
            } => {
                let _ = self.runs_finished.fetch_add(1, Ordering::SeqCst);
                let _ = self.rows_out.fetch_add(*output_rows as u64, Ordering::SeqCst);
                self.record_elapsed(*elapsed);
            }
            PipelineEvent::RunFailed { elapsed, .. } => {
                let _ = self.runs_failed.fetch_add(1, Ordering::SeqCst);
                self.record_elapsed(*elapsed);
            }
        }
    }
}

/// Immutable snapshot of [`MetricsObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetricsSnapshot {
    pub runs_started: u64,
    pub runs_finished: u64,
    pub runs_failed: u64,
    pub steps_finished: u64,
    pub rows_in: u64,
    pub rows_out: u64,
    pub last_elapsed: Option<Duration>,
}

impl fmt::Display for RunMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "runs={}/{} failed={} steps={} rows_in={} rows_out={} last_elapsed={:?}",
            self.runs_finished,
            self.runs_started,
            self.runs_failed,
            self.steps_finished,
            self.rows_in,
            self.rows_out,
            self.last_elapsed
        )
    }
}
