//! api-catalog - Convert a curated markdown list of APIs to a JSON catalog
//!
//! Usage:
//!   api-catalog                                  # tools/README.md -> public_apis.json
//!   api-catalog docs/README.md -o apis.json
//!   api-catalog --config api-catalog.toml --report report.txt --report-format text
//!   api-catalog docs/README.md --dry-run -v

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser as ClapParser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

use api_catalog::config::{load_config, ReportFormat, Settings};
use api_catalog::extractor::ExtractionReport;
use api_catalog::{convert_file, extract_file};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReportFormatArg {
    /// JSON format
    Json,
    /// Human-readable text
    Text,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Json => ReportFormat::Json,
            ReportFormatArg::Text => ReportFormat::Text,
        }
    }
}

#[derive(ClapParser)]
#[command(
    version,
    about = "Convert a curated markdown list of APIs to a JSON catalog",
    long_about = "Reads a markdown document, treats every third-level heading as a category \
                  and every table under it with \"API\" and \"Description\" columns as a list \
                  of entries, and writes the result as JSON under a top-level \"apis\" key.\n\n\
                  Tables before the first category, tables without both columns and rows \
                  with fewer than two cells are skipped."
)]
struct Cli {
    /// Input markdown file [default: tools/README.md]
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output JSON file [default: public_apis.json]
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write an extraction report
    #[arg(long, value_name = "REPORT_FILE")]
    report: Option<PathBuf>,

    /// Report format [default: json]
    #[arg(long, value_enum)]
    report_format: Option<ReportFormatArg>,

    /// Extract and print the report without writing the catalog
    #[arg(long)]
    dry_run: bool,

    /// debug log file
    #[arg(short, long, value_name = "FILE")]
    debuglogfile: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn init_logger(
    filter_level: log::LevelFilter,
    logfile: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut loggers: Vec<Box<dyn simplelog::SharedLogger>> = Vec::new();
    loggers.push(simplelog::TermLogger::new(
        filter_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ));
    if let Some(filename) = logfile {
        loggers.push(simplelog::WriteLogger::new(
            filter_level,
            simplelog::Config::default(),
            File::create(filename)?,
        ));
    }
    simplelog::CombinedLogger::init(loggers)?;
    Ok(())
}

fn resolve_settings(args: &Cli) -> anyhow::Result<Settings> {
    let settings = match &args.config {
        Some(path) => Settings::from_config(load_config(path)?),
        None => Settings::default(),
    };
    Ok(settings.with_overrides(
        args.input.clone(),
        args.output.clone(),
        args.report.clone(),
        args.report_format.map(ReportFormat::from),
    ))
}

fn write_report(report: &ExtractionReport, path: &Path, format: ReportFormat) -> anyhow::Result<()> {
    let content = match format {
        ReportFormat::Json => report.to_json()?,
        ReportFormat::Text => report.to_text(),
    };
    fs::write(path, content)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let settings = resolve_settings(args)?;
    log::debug!("settings: {:?}", settings);

    let extraction = if args.dry_run {
        let extraction = extract_file(&settings.input, &settings.output)?;
        eprintln!("{}", extraction.report.to_text());
        eprintln!("(Dry run - {} was not written)", settings.output.display());
        extraction
    } else {
        let extraction = convert_file(&settings.input, &settings.output)?;
        println!(
            "JSON file successfully created at {}",
            settings.output.display()
        );
        extraction
    };

    if let Some(report_path) = &settings.report {
        write_report(&extraction.report, report_path, settings.report_format)?;
        eprintln!("✓ Report written to {}", report_path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(e) = init_logger(args.verbose.log_level_filter(), args.debuglogfile.as_deref()) {
        eprintln!("failed to initialize logging: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
