/*!
 * Common test utilities for the gridtab test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

/// Minimal document with one tier and two intervals, the second one empty
pub const SINGLE_TIER_TEXTGRID: &str = r#"File type = "ooTextFile"
Object class = "TextGrid"
xmin = 0
xmax = 2.5
size = 1
item []:
item [1]:
    name = "words"
    intervals: size = 2
    intervals [1]:
        xmin = 0
        xmax = 1.0
        text = "hello"
    intervals [2]:
        xmin = 1.0
        xmax = 2.5
        text = ""
"#;

/// A file as Praat writes it, with the blank header line and presence flag
pub const PRAAT_TWO_TIER_TEXTGRID: &str = r#"File type = "ooTextFile"
Object class = "TextGrid"

xmin = 0
xmax = 3
tiers? <exists>
size = 2
item []:
    item [1]:
        class = "IntervalTier"
        name = "words"
        xmin = 0
        xmax = 3
        intervals: size = 2
        intervals [1]:
            xmin = 0
            xmax = 1.5
            text = "she said ""hi"""
        intervals [2]:
            xmin = 1.5
            xmax = 3
            text = ""
    item [2]:
        class = "IntervalTier"
        name = "phones"
        xmin = 0
        xmax = 3
        intervals: size = 3
        intervals [1]:
            xmin = 0
            xmax = 1
            text = "S"
        intervals [2]:
            xmin = 1
            xmax = 2
            text = "i"
        intervals [3]:
            xmin = 2
            xmax = 3
            text = ""
"#;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample TextGrid file for testing
pub fn create_test_textgrid(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, PRAAT_TWO_TIER_TEXTGRID)
}

/// Route `log` output through the test harness
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
