/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use gridtab::errors::{AppError, CollectionKind, ExportError, ParseError};

#[test]
fn test_parseError_malformedInput_shouldDisplayLineAndText() {
    let error = ParseError::MalformedInput {
        line_number: 12,
        line: "%%".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("line 12"));
    assert!(display.contains("%%"));
    assert_eq!(error.line_number(), 12);
}

#[test]
fn test_parseError_outOfContext_shouldDisplayReason() {
    let error = ParseError::OutOfContext {
        line_number: 3,
        line: "intervals [1]:".to_string(),
        reason: "no intervals collection".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("no intervals collection"));
    assert!(display.contains("intervals [1]:"));
}

#[test]
fn test_exportError_missingIndex_shouldNameCollection() {
    let error = ExportError::MissingIndex {
        collection: CollectionKind::Intervals { tier: 2 },
        index: 4,
    };
    assert_eq!(format!("{}", error), "Missing index 4 in intervals of tier 2");

    let error = ExportError::MissingIndex {
        collection: CollectionKind::Tiers,
        index: 1,
    };
    assert_eq!(format!("{}", error), "Missing index 1 in tiers");
}

#[test]
fn test_exportError_missingField_shouldDisplayFieldAndContext() {
    let error = ExportError::MissingField {
        field: "name".to_string(),
        context: "tier 3".to_string(),
    };
    assert_eq!(format!("{}", error), "Missing field 'name' in tier 3");
}

#[test]
fn test_appError_parse_shouldIncludePathAndSource() {
    let error = AppError::Parse {
        path: PathBuf::from("/data/a.TextGrid"),
        source: ParseError::UnterminatedValue { line_number: 9 },
    };
    let display = format!("{}", error);
    assert!(display.contains("/data/a.TextGrid"));
    assert!(display.contains("line 9"));
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_appError_fromIoError_shouldWrapAsFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let app_error: AppError = io_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("File error"));
    assert!(display.contains("File not found"));
}

#[test]
fn test_appError_fromAnyhowError_shouldWrapAsUnknown() {
    let anyhow_error = anyhow::anyhow!("Something went wrong");
    let app_error: AppError = anyhow_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Unknown error"));
    assert!(display.contains("Something went wrong"));
}

#[test]
fn test_appError_debug_shouldBeImplemented() {
    let error = AppError::Config("bad pattern".to_string());
    let debug = format!("{:?}", error);
    assert!(debug.contains("Config"));
}
