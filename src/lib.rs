//! `record-pipeline` is a small library for multi-stage batch processing of in-memory records.
//!
//! A [`pipeline::Pipeline`] is an ordered list of [`processing::Processor`] steps. Running it
//! threads a sequence of [`types::Record`]s through each step in turn and returns the final
//! sequence. Input records are borrowed and never mutated; every step produces new records.
//!
//! ## Built-in processors
//!
//! - [`processing::FilterProcessor`]: keep records whose field equals a value
//! - [`processing::TransformProcessor`]: replace one field with `f(value)`
//! - [`processing::AggregateProcessor`]: group by a field and sum (or count/min/max/mean)
//!   another, emitting one record per group in first-seen order
//!
//! ## Example: filter → transform → aggregate
//!
//! ```rust
//! use record_pipeline::pipeline::Pipeline;
//! use record_pipeline::processing::{AggregateProcessor, FilterProcessor, TransformProcessor};
//! use record_pipeline::record;
//! use record_pipeline::types::Value;
//!
//! let records = vec![
//!     record! { "id" => 1, "status" => "active", "revenue" => 1000.0, "region" => "North" },
//!     record! { "id" => 2, "status" => "inactive", "revenue" => 500.0, "region" => "North" },
//!     record! { "id" => 3, "status" => "active", "revenue" => 750.0, "region" => "South" },
//!     record! { "id" => 4, "status" => "active", "revenue" => 300.0, "region" => "North" },
//! ];
//!
//! let pipeline = Pipeline::new()
//!     .with_step(FilterProcessor::new("status", "active"))
//!     .with_step(TransformProcessor::numeric("revenue", |x| (x * 1.10 * 100.0).round() / 100.0))
//!     .with_step(AggregateProcessor::new("region", "revenue"));
//!
//! let out = pipeline.run(&records).unwrap();
//! assert_eq!(out[0].get("region"), Some(&Value::from("North")));
//! assert_eq!(out[0].get("revenue"), Some(&Value::Float64(1430.0)));
//! assert_eq!(out[1].get("revenue"), Some(&Value::Float64(825.0)));
//! ```
//!
//! ## Modules
//!
//! - [`types`]: [`types::Record`] and [`types::Value`]
//! - [`processing`]: the [`processing::Processor`] trait and built-in processors
//! - [`pipeline`]: step composition and execution
//! - [`execution`]: timing, observers/metrics and retry helpers around runs
//! - [`ingestion`]: loading records from JSON/NDJSON and CSV
//! - [`config`]: JSON pipeline descriptions
//! - [`error`]: the crate-wide error type
//!
//! ## Timing and observability
//!
//! [`pipeline::Pipeline::run_timed`] prints an `[EXECUTION TIME]` line to stdout. For structured
//! output, attach an [`execution::PipelineObserver`] (e.g. [`execution::TracingObserver`] or
//! [`execution::MetricsObserver`]); `run` also emits `tracing` events directly.

pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::Pipeline;
pub use types::{Record, Value};
