//! DLF Parser Library
//!
//! A Rust library for decoding the binary channel files written by industrial
//! data loggers and exporting them as time-bucketed CSV summaries.
//!
//! Each channel file starts with a fixed 304-byte header followed by
//! `data_length` little-endian `f64` samples taken every `sample_period`
//! milliseconds from a FILETIME start time. Files are grouped into one folder
//! per logger unit; a group's samples are merged and averaged into
//! epoch-aligned buckets.
//!
//! # Features
//!
//! - **`csv`** (default): Enable CSV export functionality
//! - **`cli`** (default): Build the command-line interface binary
//! - **`json`**: Enable header export in JSON format
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! Decode a single channel file:
//! ```rust,no_run
//! use dlf_parser::decode_file;
//! use std::path::Path;
//!
//! let file = decode_file(Path::new("TR2_UNIT04/flow.001")).unwrap();
//! println!("{} [{}]", file.header.title, file.header.eng_units);
//! println!("Decoded {} samples ({} NaN dropped)", file.decode.samples.len(), file.decode.nan_count);
//! ```
//!
//! Export a group folder to CSV:
//! ```rust,no_run
//! use dlf_parser::{process_group, BatchOptions, BucketWidth, CancelFlag};
//! use std::path::Path;
//!
//! let mut options = BatchOptions::default();
//! options.export.bucket = BucketWidth::Minutes10;
//! let report = process_group(Path::new("TR2_UNIT04"), &options, &CancelFlag::new()).unwrap();
//! println!("{:?}", report.outcome);
//! ```
//!
//! # Public API
//!
//! ## Decoding Functions
//! - [`to_utc`] - Convert FILETIME ticks to a UTC instant
//! - [`decode_header`] - Decode the fixed header record
//! - [`decode_samples`] - Decode the sample array following the header
//! - [`decode_file`] / [`decode_bytes`] - Decode a whole channel file
//!
//! ## Aggregation Functions
//! - [`merge_samples`] - Merge per-file samples into one chronological series
//! - [`aggregate`] - Average samples into epoch-aligned buckets
//!
//! ## Batch and Export Functions
//! - [`list_groups`] / [`list_data_files`] - Folder enumeration
//! - [`decode_group`] - Parallel decode of a group's files
//! - [`process_group`] - Decode, aggregate and write one group's CSV
//! - [`export_to_csv`] - Write aggregate points as `Time,Value` rows

// Module declarations
pub mod aggregate;
pub mod batch;
pub mod clock;
pub mod config;
pub mod conversion;
pub mod error;
pub mod export;
pub mod parser;
pub mod types;

pub use aggregate::*;
pub use batch::*;
pub use clock::*;
pub use config::*;
pub use conversion::*;
pub use error::*;
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use parser::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;

// Re-export Result type for the batch and export layers
pub use anyhow::Result;
