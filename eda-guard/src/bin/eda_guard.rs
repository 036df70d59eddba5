//! eda-guard command line.
//!
//! Loads the settings file, the dataset and the field table, runs every
//! resolved check and prints the report. Exits with status 1 when any check
//! failed or could not be evaluated.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use eda_guard::config::AppConfig;
use eda_guard::core::{CheckStatus, Validator};
use eda_guard::formatters::{
    FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter, ReportFormatter,
};
use eda_guard::logging::setup::{init_logging, LoggingConfig};
use eda_guard::logging::{EventLog, LogConfig};
use eda_guard::sources::{format_file_size, CsvSource, DataSource, FieldTableSource};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Markdown,
}

#[derive(Parser, Debug)]
#[command(name = "eda-guard", version, about = "Validate a dataset against its field table")]
struct Cli {
    /// Path to the JSON settings file
    #[arg(short, long)]
    config: PathBuf,

    /// Dataset file, overriding `data_path`
    #[arg(long)]
    data: Option<PathBuf>,

    /// Field table file, overriding `eda_config_path`
    #[arg(long)]
    fields: Option<PathBuf>,

    /// Sheet of a JSON workbook holding the field descriptors
    #[arg(long)]
    sheet: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only list checks that failed or errored
    #[arg(long)]
    problems_only: bool,

    /// Emit diagnostics as JSON
    #[arg(long)]
    json_logs: bool,

    /// Debug-level diagnostics with per-check detail
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let logging = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::default()
    }
    .with_json_format(cli.json_logs);
    init_logging(logging).map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    if let Some(data) = cli.data.clone() {
        config = config.with_data_path(data);
    }
    if let Some(fields) = cli.fields.clone() {
        config = config.with_fields_path(fields);
    }
    if let Some(sheet) = cli.sheet.clone() {
        config = config.with_fields_sheet(sheet);
    }
    config.validate()?;

    let events = EventLog::create(&config.log_path)
        .with_context(|| format!("creating event log in {}", config.log_path.display()))?;
    events.info(
        "load_config",
        "CONFIG_LOADED",
        &format!("log path set to {}", config.log_path.display()),
    )?;

    let source = CsvSource::from_config(&config);
    let dataset = match source.load().await {
        Ok(dataset) => dataset,
        Err(e) => {
            events.error("load_data", "DATA_NOT_LOADED", &e.to_string())?;
            return Err(e).context("loading dataset");
        }
    };
    events.info(
        "load_data",
        "DATA_LOADED",
        &format!(
            "{} ({}): {} rows, {} columns",
            config.data_path.display(),
            format_file_size(source.file_size().unwrap_or_default()),
            dataset.num_rows(),
            dataset.num_columns()
        ),
    )?;

    let fields = match FieldTableSource::from_config(&config).load().await {
        Ok(fields) => fields,
        Err(e) => {
            events.error("load_fields", "FIELDS_NOT_LOADED", &e.to_string())?;
            return Err(e).context("loading field table");
        }
    };
    events.info(
        "load_fields",
        "FIELDS_LOADED",
        &format!("{} field descriptors", fields.len()),
    )?;

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let run_name = config
        .data_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| config.data_path.display().to_string());

    let report = match Validator::new()
        .with_log_config(log_config)
        .validate(&run_name, &dataset, &fields)
    {
        Ok(report) => report,
        Err(e) => {
            events.error("validation", "RUN_ABORTED", &e.to_string())?;
            return Err(e).context("running checks");
        }
    };

    for entry in &report.entries {
        let occurrence = format!("{} / {}", entry.field, entry.check);
        let detail = if entry.details.is_empty() {
            entry.evidence.clone()
        } else {
            format!("{}: {}", entry.evidence, entry.details)
        };
        match entry.status {
            CheckStatus::Pass => events.info("validation", &occurrence, &detail)?,
            CheckStatus::Fail => events.fail("validation", &occurrence, &detail)?,
            CheckStatus::Error => events.error("validation", &occurrence, &detail)?,
        }
    }

    let to_terminal = cli.output.is_none() && std::io::stdout().is_terminal();
    let formatter_config = FormatterConfig::default()
        .with_only_problems(cli.problems_only)
        .with_skipped(cli.verbose)
        .with_colors(to_terminal);
    let formatter: Box<dyn ReportFormatter> = match cli.format {
        OutputFormat::Human => Box::new(HumanFormatter::with_config(formatter_config)),
        OutputFormat::Json => Box::new(JsonFormatter::with_config(formatter_config)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::with_config(formatter_config)),
    };
    let rendered = formatter.format(&report)?;

    match &cli.output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("writing report to {}", path.display()))?,
        None => println!("{rendered}"),
    }

    events.info(
        "validation",
        "RUN_FINISHED",
        &format!(
            "{} checks: {} passed, {} failed, {} errors",
            report.metrics.total_checks,
            report.metrics.passed_checks,
            report.metrics.failed_checks,
            report.metrics.errored_checks
        ),
    )?;

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
