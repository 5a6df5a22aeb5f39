use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use regex::Regex;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::document::Document;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::table_exporter::{Identity, TableSet};
use crate::textgrid_parser::DocumentParser;

// @module: Batch controller turning TextGrid files into tables

/// A file that could not be turned into rows
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: AppError,
}

/// Outcome of a batch run
#[derive(Debug)]
pub struct BatchSummary {
    /// Files whose rows were appended
    pub processed: usize,
    /// Files that failed, in processing order
    pub failures: Vec<FileFailure>,
    pub document_rows: usize,
    pub interval_rows: usize,
    pub document_table: PathBuf,
    pub interval_table: PathBuf,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} processed, {} failed, {} document rows, {} interval rows",
            self.processed,
            self.failures.len(),
            self.document_rows,
            self.interval_rows
        )
    }
}

/// Main application controller for table export
pub struct Controller {
    // @field: App configuration
    pub config: Config,

    // @field: Compiled annotator pattern
    annotator_pattern: Regex,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        let annotator_pattern = config.annotator_regex()?;
        Ok(Self {
            config,
            annotator_pattern,
        })
    }

    /// Parser configured with the controller's strictness
    pub fn parser(&self) -> DocumentParser {
        DocumentParser::new(self.config.strictness)
    }

    /// Expand an input path into the list of files to process
    pub fn collect_inputs(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if FileManager::file_exists(input) {
            Ok(vec![input.to_path_buf()])
        } else if FileManager::dir_exists(input) {
            let files = FileManager::find_files(input, &self.config.extension)?;
            debug!("Found {} .{} files in {:?}", files.len(), self.config.extension, input);
            Ok(files)
        } else {
            Err(anyhow!("Input path does not exist: {:?}", input))
        }
    }

    /// Identity columns for one input file
    pub fn identity_for(&self, path: &Path) -> Identity {
        FileManager::identity_for(path, &self.annotator_pattern, &self.config.annotator_fallback)
    }

    /// Read and parse one file
    pub fn process_file(&self, path: &Path) -> Result<(Document, Identity), AppError> {
        let content = FileManager::read_textgrid(path)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;
        let document = self
            .parser()
            .parse_str(&content)
            .map_err(|source| AppError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        for skipped in &document.skipped_lines {
            debug!("{:?} line {} skipped: {}", path, skipped.line_number, skipped.reason);
        }

        Ok((document, self.identity_for(path)))
    }

    /// Parse every input, append rows and write both tables to `output_dir`.
    ///
    /// A failing file is recorded and skipped; it never leaves rows behind.
    pub fn run(&self, inputs: &[PathBuf], output_dir: &Path) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();
        FileManager::ensure_dir(output_dir)?;

        let progress_bar = ProgressBar::new(inputs.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("=>-"));

        let mut tables = TableSet::new();
        let mut processed = 0;
        let mut failures = Vec::new();

        for path in inputs {
            let file_name = path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress_bar.set_message(format!("Processing: {}", file_name));

            let outcome = self.process_file(path).and_then(|(document, identity)| {
                tables
                    .append(&document, &identity)
                    .map_err(|source| AppError::Export {
                        path: path.clone(),
                        source,
                    })
            });

            match outcome {
                Ok(()) => processed += 1,
                Err(e) => {
                    error!("{}", e);
                    failures.push(FileFailure {
                        path: path.clone(),
                        error: e,
                    });
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        let (document_table, interval_table) = self.write_tables(&tables, output_dir)?;

        let summary = BatchSummary {
            processed,
            failures,
            document_rows: tables.documents.len(),
            interval_rows: tables.intervals.len(),
            document_table,
            interval_table,
        };

        info!(
            "Export completed in {}: {}",
            Self::format_duration(start_time.elapsed()),
            summary.summary()
        );

        if !summary.is_success() {
            let log_file_path = output_dir.join("gridtab.issues.log");
            if let Err(e) = self.write_issues_log(&summary, &log_file_path) {
                warn!("Failed to write issues log: {}", e);
            } else {
                info!("Issues written to {}", log_file_path.display());
            }
        }

        Ok(summary)
    }

    /// Write both tables, returning their paths
    pub fn write_tables(&self, tables: &TableSet, output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let document_path = output_dir.join(&self.config.document_table);
        let interval_path = output_dir.join(&self.config.interval_table);

        let file = File::create(&document_path)
            .with_context(|| format!("Failed to create table: {}", document_path.display()))?;
        tables.write_documents_tsv(&mut BufWriter::new(file))?;

        let file = File::create(&interval_path)
            .with_context(|| format!("Failed to create table: {}", interval_path.display()))?;
        tables.write_intervals_tsv(&mut BufWriter::new(file))?;

        info!("Success: {}", document_path.display());
        info!("Success: {}", interval_path.display());
        Ok((document_path, interval_path))
    }

    /// Append the failure list of a run to the issues log
    fn write_issues_log(&self, summary: &BatchSummary, log_file_path: &Path) -> Result<()> {
        FileManager::append_to_log_file(log_file_path, &format!("Batch export: {}", summary.summary()))?;
        for failure in &summary.failures {
            FileManager::append_to_log_file(log_file_path, &format!("[ERROR] {}", failure.error))?;
        }
        Ok(())
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
