//! Ordered multi-stage record processing.
//!
//! A [`Pipeline`] owns an append-only list of [`Processor`] steps. [`Pipeline::run`] threads the
//! caller's records through each step in order, feeding each step's output to the next.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::execution::{PipelineEvent, PipelineObserver, format_execution_time, timed};
use crate::processing::{Processor, validate_non_empty};
use crate::types::Record;

/// An ordered sequence of processors.
///
/// ```rust
/// use record_pipeline::pipeline::Pipeline;
/// use record_pipeline::processing::{AggregateProcessor, FilterProcessor};
/// use record_pipeline::record;
///
/// let mut pipeline = Pipeline::new();
/// pipeline
///     .add_step(FilterProcessor::new("status", "active"))
///     .add_step(AggregateProcessor::new("region", "revenue"));
///
/// let out = pipeline
///     .run(&[
///         record! { "status" => "active", "region" => "North", "revenue" => 2.0 },
///         record! { "status" => "active", "region" => "North", "revenue" => 3.0 },
///     ])
///     .unwrap();
/// assert_eq!(out, vec![record! { "region" => "North", "revenue" => 5.0 }]);
/// ```
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Processor>>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step and return this same pipeline for chaining.
    pub fn add_step<P: Processor + 'static>(&mut self, step: P) -> &mut Self {
        self.add_boxed_step(Box::new(step))
    }

    /// Append an already boxed step.
    pub fn add_boxed_step(&mut self, step: Box<dyn Processor>) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Owned-builder form of [`Pipeline::add_step`].
    pub fn with_step<P: Processor + 'static>(mut self, step: P) -> Self {
        self.add_step(step);
        self
    }

    /// Attach an observer for run/step events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no step has been added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names, in step order.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// One-line description listing every step name in order.
    ///
    /// Format: `Pipeline(N steps): name1 -> name2`, for example
    /// `Pipeline(2 steps): filter(status == "active") -> aggregate(sum(revenue) by region)`.
    pub fn summary(&self) -> String {
        let n = self.steps.len();
        let noun = if n == 1 { "step" } else { "steps" };
        if n == 0 {
            return format!("Pipeline(0 {noun})");
        }
        format!("Pipeline({n} {noun}): {}", self.step_names().join(" -> "))
    }

    /// Check the caller's input before any step runs.
    ///
    /// Delegates to the first step's [`Processor::validate_input`]; an empty pipeline only
    /// rejects an empty sequence.
    pub fn validate_input(&self, records: &[Record]) -> PipelineResult<()> {
        match self.steps.first() {
            Some(first) => first.validate_input(records),
            None => validate_non_empty(records),
        }
    }

    /// Run every step in order and return the final records.
    ///
    /// The caller's records are validated first. A failing step aborts the run with
    /// [`PipelineError::StepFailed`]; there is no partial result.
    pub fn run(&self, records: &[Record]) -> PipelineResult<Vec<Record>> {
        let start = Instant::now();
        info!(steps = self.steps.len(), input_rows = records.len(), "pipeline run started");
        self.emit(PipelineEvent::RunStarted {
            steps: self.steps.len(),
            input_rows: records.len(),
        });

        let result = self.run_steps(records);

        let elapsed = start.elapsed();
        match &result {
            Ok(out) => {
                info!(
                    output_rows = out.len(),
                    elapsed_us = elapsed.as_micros() as u64,
                    "pipeline run finished"
                );
                self.emit(PipelineEvent::RunFinished {
                    output_rows: out.len(),
                    elapsed,
                });
            }
            Err(e) => {
                info!(error = %e, "pipeline run failed");
                self.emit(PipelineEvent::RunFailed {
                    message: e.to_string(),
                    elapsed,
                });
            }
        }
        result
    }

    /// [`Pipeline::run`] wrapped in wall-clock timing printed to stdout.
    ///
    /// Prints `[EXECUTION TIME] pipeline run: <seconds>s` whether or not the run succeeds.
    pub fn run_timed(&self, records: &[Record]) -> PipelineResult<Vec<Record>> {
        self.run_timed_to(records, &mut io::stdout().lock())
    }

    /// Like [`Pipeline::run_timed`], but writes the timing line to `out`.
    pub fn run_timed_to<W: Write>(
        &self,
        records: &[Record],
        out: &mut W,
    ) -> PipelineResult<Vec<Record>> {
        let (result, elapsed) = timed(|| self.run(records));
        writeln!(out, "{}", format_execution_time("pipeline run", elapsed))?;
        result
    }

    fn run_steps(&self, records: &[Record]) -> PipelineResult<Vec<Record>> {
        self.validate_input(records)?;

        let mut current: Option<Vec<Record>> = None;
        for (index, step) in self.steps.iter().enumerate() {
            let input = current.as_deref().unwrap_or(records);
            let step_start = Instant::now();
            let out = step.process(input).map_err(|source| PipelineError::StepFailed {
                index,
                name: step.name(),
                source: Box::new(source),
            })?;
            let elapsed = step_start.elapsed();

            debug!(
                index,
                step = %step.name(),
                input_rows = input.len(),
                output_rows = out.len(),
                "step finished"
            );
            self.emit(PipelineEvent::StepFinished {
                index,
                name: step.name(),
                input_rows: input.len(),
                output_rows: out.len(),
                elapsed,
            });
            current = Some(out);
        }

        Ok(current.unwrap_or_else(|| records.to_vec()))
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}
