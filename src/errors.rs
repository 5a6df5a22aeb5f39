/*!
 * Error types for the gridtab application.
 *
 * This module contains custom error types for the parsing and export stages,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a TextGrid document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A line matches none of the recognized line shapes
    #[error("Malformed input at line {line_number}: {line:?}")]
    MalformedInput {
        /// 1-based line number
        line_number: usize,
        /// The offending line, without its line terminator
        line: String,
    },

    /// A recognized line appeared where the current parser state cannot accept it
    #[error("Unexpected line {line_number} ({reason}): {line:?}")]
    OutOfContext {
        /// 1-based line number
        line_number: usize,
        /// The offending line, without its line terminator
        line: String,
        /// What the parser expected instead
        reason: String,
    },

    /// The input ended inside a quoted value
    #[error("Unterminated quoted value starting at line {line_number}")]
    UnterminatedValue {
        /// Line where the quoted value began
        line_number: usize,
    },
}

impl ParseError {
    /// Line number the error points at
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedInput { line_number, .. }
            | Self::OutOfContext { line_number, .. }
            | Self::UnterminatedValue { line_number } => *line_number,
        }
    }
}

/// Which indexed collection an export lookup was walking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionKind {
    /// The document's tiers
    Tiers,
    /// The intervals of the given tier
    Intervals {
        /// 1-based tier index
        tier: usize,
    },
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tiers => write!(f, "tiers"),
            Self::Intervals { tier } => write!(f, "intervals of tier {}", tier),
        }
    }
}

/// Errors that can occur while flattening a document into table rows
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// An index in the expected contiguous range 1..=count is absent
    #[error("Missing index {index} in {collection}")]
    MissingIndex {
        /// Collection being walked
        collection: CollectionKind,
        /// The absent 1-based index
        index: usize,
    },

    /// A required attribute is absent
    #[error("Missing field '{field}' in {context}")]
    MissingField {
        /// Attribute key that was looked up
        field: String,
        /// Where the lookup happened, e.g. "document" or "tier 2, interval 5"
        context: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// A document failed to parse
    #[error("Parse error in {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying parser error
        #[source]
        source: ParseError,
    },

    /// A parsed document could not be flattened into rows
    #[error("Export error in {path}: {source}")]
    Export {
        /// File that failed
        path: PathBuf,
        /// Underlying exporter error
        #[source]
        source: ExportError,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
