/*!
 * Tests for application controller functionality
 */

use anyhow::Result;
use gridtab::app_config::Config;
use gridtab::app_controller::Controller;
use gridtab::errors::AppError;
use gridtab::textgrid_parser::Strictness;
use crate::common;

/// Test creating a controller with the default configuration
#[test]
fn test_new_with_default_config_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config.extension, "TextGrid");
    assert_eq!(controller.parser().strictness(), Strictness::Strict);
    Ok(())
}

/// Test that an invalid configuration is rejected
#[test]
fn test_with_config_withInvalidPattern_shouldFail() {
    let config = Config {
        annotator_pattern: "(".to_string(),
        ..Config::default()
    };
    assert!(Controller::with_config(config).is_err());
}

/// Test collecting inputs from a file, a directory and a missing path
#[test]
fn test_collect_inputs_withVariousPaths_shouldExpandDirectories() -> Result<()> {
    let controller = Controller::new_for_test()?;
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_test_textgrid(temp_dir.path(), "one.TextGrid")?;
    common::create_test_textgrid(temp_dir.path(), "two.TextGrid")?;
    common::create_test_file(temp_dir.path(), "readme.md", "")?;

    assert_eq!(controller.collect_inputs(&first)?, vec![first.clone()]);
    assert_eq!(controller.collect_inputs(temp_dir.path())?.len(), 2);
    assert!(controller.collect_inputs(&temp_dir.path().join("missing")).is_err());
    Ok(())
}

/// Test processing a single file with an annotator in its name
#[test]
fn test_process_file_withValidFile_shouldReturnDocumentAndIdentity() -> Result<()> {
    let controller = Controller::new_for_test()?;
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_textgrid(temp_dir.path(), "rec.bmp.kim.TextGrid")?;

    let (document, identity) = controller.process_file(&path)?;

    assert_eq!(document.tier_count(), 2);
    assert_eq!(identity.filename, "rec.bmp.kim.TextGrid");
    assert_eq!(identity.annotator_id, "kim");
    assert_eq!(identity.directory, temp_dir.path().to_string_lossy());
    Ok(())
}

/// Test that parse failures carry the file path
#[test]
fn test_process_file_withMalformedFile_shouldReturnParseError() -> Result<()> {
    let controller = Controller::new_for_test()?;
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "bad.TextGrid", "xmin = 0\n@@@\n")?;

    match controller.process_file(&path) {
        Err(AppError::Parse { path: failed, source }) => {
            assert_eq!(failed, path);
            assert_eq!(source.line_number(), 2);
        }
        other => panic!("expected a parse error, got {:?}", other.map(|(d, _)| d)),
    }
    Ok(())
}

/// Test the lenient controller accepts the same malformed file
#[test]
fn test_process_file_lenientWithMalformedFile_shouldSucceed() -> Result<()> {
    let controller = Controller::with_config(Config {
        strictness: Strictness::Lenient,
        ..Config::default()
    })?;
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "bad.TextGrid", "xmin = 0\n@@@\n")?;

    let (document, _) = controller.process_file(&path)?;
    assert_eq!(document.skipped_lines.len(), 1);
    Ok(())
}

/// Test duration formatting
#[test]
fn test_format_duration_withVariousDurations_shouldFormatCorrectly() {
    use std::time::Duration;
    assert_eq!(Controller::format_duration(Duration::from_millis(1500)), "1.500s");
    assert_eq!(Controller::format_duration(Duration::from_secs(125)), "2m 5s");
    assert_eq!(Controller::format_duration(Duration::from_secs(3725)), "1h 2m 5s");
}
