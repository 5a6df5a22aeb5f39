/*!
 * # gridtab - TextGrid annotation files to statistics tables
 *
 * A Rust library for turning Praat TextGrid files (long text format) into
 * two tab-separated tables ready for import into R or similar tools.
 *
 * ## Features
 *
 * - Parse the long TextGrid serialization into a typed document tree
 * - Strict or lenient handling of unrecognized lines
 * - Flatten documents into a one-row-per-file table and a
 *   one-row-per-interval table
 * - Batch processing of files and directories with per-file error reporting
 * - Annotator ids extracted from filenames with a configurable pattern
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Document, tier and interval model
 * - `textgrid_parser`: Line classification and the parsing state machine
 * - `table_exporter`: Row building and TSV output
 * - `file_utils`: File system operations
 * - `app_controller`: Batch controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod table_exporter;
pub mod textgrid_parser;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{Attributes, Document, Interval, Tier};
pub use errors::{AppError, ExportError, ParseError};
pub use table_exporter::{DocumentRow, Identity, IntervalRow, TableExporter, TableSet};
pub use textgrid_parser::{DocumentParser, Strictness};
