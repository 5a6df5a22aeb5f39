// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use gridtab::app_config::{self, Config};
use gridtab::app_controller::Controller;
use gridtab::file_utils::FileManager;
use gridtab::textgrid_parser::{DocumentParser, Strictness};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export TextGrid files to document and interval tables (default command)
    Export(ExportArgs),

    /// Parse a single TextGrid file and print it as JSON
    Inspect {
        /// TextGrid file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Skip unrecognized lines instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Generate shell completions for gridtab
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// TextGrid files or directories to process
    #[arg(value_name = "INPUT_PATH", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the tables are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip unrecognized lines instead of failing the file
    #[arg(long)]
    lenient: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "gridtab.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// gridtab - TextGrid files to statistics tables
///
/// Parses Praat TextGrid files (long text format) and writes one table with a
/// row per file and one table with a row per interval.
#[derive(Parser, Debug)]
#[command(name = "gridtab")]
#[command(version = "0.1.0")]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Flatten TextGrid annotation files into tab-separated tables")]
#[command(long_about = "gridtab parses TextGrid annotation files and flattens them into two tables.

EXAMPLES:
    gridtab recordings/                         # Export every .TextGrid under recordings/
    gridtab -o out/ a.TextGrid b.TextGrid       # Export two files into out/
    gridtab --lenient recordings/               # Skip stray lines instead of failing
    gridtab inspect a.TextGrid                  # Print the parsed document as JSON
    gridtab completions bash > gridtab.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in gridtab.json by default. If the file doesn't
    exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TextGrid files or directories to process
    #[arg(value_name = "INPUT_PATH")]
    inputs: Vec<PathBuf>,

    /// Directory the tables are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip unrecognized lines instead of failing the file
    #[arg(long)]
    lenient: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "gridtab.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> ExitCode {
    // The logger accepts everything; log::set_max_level does the filtering
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "gridtab", &mut std::io::stdout());
            Ok(true)
        }
        Some(Commands::Inspect { file, lenient }) => run_inspect(file, lenient),
        Some(Commands::Export(args)) => run_export(args),
        None => {
            // Default behavior - use top-level args
            if cli.inputs.is_empty() {
                return Err(anyhow!("INPUT_PATH is required when no subcommand is specified"));
            }
            run_export(ExportArgs {
                inputs: cli.inputs,
                output_dir: cli.output_dir,
                lenient: cli.lenient,
                config_path: cli.config_path,
                log_level: cli.log_level,
            })
        }
    }
}

fn run_export(options: ExportArgs) -> Result<bool> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if options.lenient {
        config.strictness = Strictness::Lenient;
    }
    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    let controller = Controller::with_config(config)?;

    let mut inputs = Vec::new();
    for input in &options.inputs {
        inputs.extend(controller.collect_inputs(input)?);
    }
    if inputs.is_empty() {
        return Err(anyhow!("No .{} files found in the given inputs", controller.config.extension));
    }
    info!("Exporting {} files", inputs.len());

    let summary = controller.run(&inputs, &options.output_dir)?;
    for failure in &summary.failures {
        error!("Failed: {}", failure.error);
    }
    Ok(summary.is_success())
}

fn run_inspect(file: PathBuf, lenient: bool) -> Result<bool> {
    let strictness = if lenient { Strictness::Lenient } else { Strictness::Strict };
    let content = FileManager::read_textgrid(&file)?;
    let document = DocumentParser::new(strictness)
        .parse_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let json = serde_json::to_string_pretty(&document).context("Failed to serialize document")?;
    println!("{}", json);
    Ok(true)
}
