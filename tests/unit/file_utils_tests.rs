/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use regex::Regex;
use gridtab::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
    Ok(())
}

/// Test that ensure_dir creates nested directories as needed
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("out").join("tables");

    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));
    Ok(())
}

/// Test that find_files matches extensions case-insensitively, recursively and in sorted order
#[test]
fn test_find_files_withMixedDirectory_shouldReturnSortedMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sub = temp_dir.path().join("session2");
    fs::create_dir_all(&sub)?;
    common::create_test_file(temp_dir.path(), "b.TextGrid", "")?;
    common::create_test_file(temp_dir.path(), "a.textgrid", "")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "")?;
    common::create_test_file(&sub, "c.TextGrid", "")?;

    let files = FileManager::find_files(temp_dir.path(), ".TextGrid")?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.textgrid", "b.TextGrid", "session2/c.TextGrid"]);
    Ok(())
}

/// Test decoding of the encodings Praat writes
#[test]
fn test_decode_text_withByteOrderMarks_shouldDecode() -> Result<()> {
    assert_eq!(FileManager::decode_text(b"xmin = 0")?, "xmin = 0");
    assert_eq!(FileManager::decode_text(b"\xEF\xBB\xBFxmin = 0")?, "xmin = 0");

    let mut utf16le = vec![0xFF, 0xFE];
    for unit in "text = \"é\"".encode_utf16() {
        utf16le.extend_from_slice(&unit.to_le_bytes());
    }
    assert_eq!(FileManager::decode_text(&utf16le)?, "text = \"é\"");

    let mut utf16be = vec![0xFE, 0xFF];
    for unit in "size = 1".encode_utf16() {
        utf16be.extend_from_slice(&unit.to_be_bytes());
    }
    assert_eq!(FileManager::decode_text(&utf16be)?, "size = 1");

    assert!(FileManager::decode_text(&[0xFF, 0xFE, 0x41]).is_err());
    Ok(())
}

/// Test that read_textgrid reports missing files
#[test]
fn test_read_textgrid_withMissingFile_shouldFail() {
    let result = FileManager::read_textgrid("does/not/exist.TextGrid");
    assert!(result.is_err());
}

/// Test identity extraction from filenames
#[test]
fn test_identity_for_withAnnotatorPattern_shouldExtractOrFallBack() -> Result<()> {
    let pattern = Regex::new(r"bmp\.(\w+)\.TextGrid")?;

    let identity = FileManager::identity_for(Path::new("/data/s01/rec1.bmp.jd.TextGrid"), &pattern, "BLANK");
    assert_eq!(identity.directory, "/data/s01");
    assert_eq!(identity.filename, "rec1.bmp.jd.TextGrid");
    assert_eq!(identity.annotator_id, "jd");

    let identity = FileManager::identity_for(Path::new("/data/s01/rec2.TextGrid"), &pattern, "BLANK");
    assert_eq!(identity.annotator_id, "BLANK");
    Ok(())
}

/// Test that append_to_log_file appends timestamped lines
#[test]
fn test_append_to_log_file_calledTwice_shouldKeepBothLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let log_path = temp_dir.path().join("logs").join("issues.log");

    FileManager::append_to_log_file(&log_path, "first")?;
    FileManager::append_to_log_file(&log_path, "second")?;

    let content = fs::read_to_string(&log_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("] first"));
    assert!(lines[1].ends_with("] second"));
    Ok(())
}
