//! Loading caller records from files.
//!
//! Most callers should use [`load_records`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - reads the file into a `Vec<Record>`
//! - optionally retries transient I/O failures
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod json;
pub mod unified;

pub use unified::{IngestionFormat, IngestionOptions, load_records};
