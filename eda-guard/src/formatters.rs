//! Report formatting for validation runs.
//!
//! Formatters turn a [`ValidationReport`] into JSON, human-readable text or
//! Markdown.
//!
//! # Examples
//!
//! ```rust
//! use eda_guard::core::{CheckResult, ValidationReport};
//! use eda_guard::formatters::{FormatterConfig, HumanFormatter, ReportFormatter};
//!
//! let mut report = ValidationReport::new("sales.csv");
//! report.record("qty", "no-zero", CheckResult::fail("Zeroed: 25.00%", "first occurrence at row 3 (value: '0')"));
//!
//! let formatter = HumanFormatter::with_config(FormatterConfig::ci());
//! let text = formatter.format(&report).unwrap();
//! assert!(text.contains("Validation FAILED"));
//! assert!(text.contains("Zeroed: 25.00%"));
//! ```

use crate::core::{CheckStatus, ReportEntry, ValidationReport};
use crate::prelude::*;
use serde_json::Value;
use std::fmt::Write;

/// Configuration options for formatting validation reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the metrics summary
    pub include_metrics: bool,
    /// Include per-check entries
    pub include_entries: bool,
    /// Only list entries whose status is fail or error
    pub only_problems: bool,
    /// Include tags that were resolved but not executed
    pub include_skipped: bool,
    /// Maximum number of entries to display (`None` for all)
    pub max_entries: Option<usize>,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include timestamps in output
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_metrics: true,
            include_entries: true,
            only_problems: false,
            include_skipped: false,
            max_entries: None,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Summary only.
    pub fn minimal() -> Self {
        Self {
            include_metrics: true,
            include_entries: false,
            only_problems: true,
            include_skipped: false,
            max_entries: Some(0),
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Everything, including skipped tags.
    pub fn detailed() -> Self {
        Self {
            include_skipped: true,
            ..Self::default()
        }
    }

    /// Problems only, uncolored, capped at 50 entries.
    pub fn ci() -> Self {
        Self {
            include_metrics: true,
            include_entries: true,
            only_problems: true,
            include_skipped: false,
            max_entries: Some(50),
            use_colors: false,
            include_timestamps: true,
        }
    }

    pub fn with_metrics(mut self, include: bool) -> Self {
        self.include_metrics = include;
        self
    }

    pub fn with_entries(mut self, include: bool) -> Self {
        self.include_entries = include;
        self
    }

    pub fn with_only_problems(mut self, only: bool) -> Self {
        self.only_problems = only;
        self
    }

    pub fn with_skipped(mut self, include: bool) -> Self {
        self.include_skipped = include;
        self
    }

    pub fn with_max_entries(mut self, max: Option<usize>) -> Self {
        self.max_entries = max;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Entries to show and how many were left out.
    fn select<'a>(&self, report: &'a ValidationReport) -> (Vec<&'a ReportEntry>, usize) {
        if !self.include_entries {
            return (Vec::new(), 0);
        }
        let matching: Vec<&ReportEntry> = report
            .entries
            .iter()
            .filter(|e| !self.only_problems || !e.status.is_pass())
            .collect();
        let total = matching.len();
        let shown: Vec<&ReportEntry> = match self.max_entries {
            Some(max) => matching.into_iter().take(max).collect(),
            None => matching,
        };
        let hidden = total - shown.len();
        (shown, hidden)
    }
}

/// Converts a validation report into a textual representation.
///
/// ```rust
/// use eda_guard::core::ValidationReport;
/// use eda_guard::formatters::ReportFormatter;
///
/// struct CountOnly;
///
/// impl ReportFormatter for CountOnly {
///     fn format(&self, report: &ValidationReport) -> eda_guard::Result<String> {
///         Ok(format!("{} checks", report.metrics.total_checks))
///     }
/// }
/// ```
pub trait ReportFormatter {
    /// Formats a report with the formatter's own configuration.
    fn format(&self, report: &ValidationReport) -> Result<String>;

    /// Formats a report with an explicit configuration.
    ///
    /// The default ignores `config`.
    fn format_with_config(
        &self,
        report: &ValidationReport,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(report)
    }
}

/// Formats reports as JSON for machine consumption.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &ValidationReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut value = serde_json::to_value(report)?;
        let (shown, hidden) = config.select(report);

        if let Value::Object(map) = &mut value {
            map.insert("success".to_string(), Value::Bool(report.is_success()));
            if !config.include_metrics {
                map.remove("metrics");
            }
            if !config.include_timestamps {
                map.remove("timestamp");
            }
            if !config.include_skipped {
                map.remove("skipped");
            }
            if config.include_entries {
                map.insert("entries".to_string(), serde_json::to_value(&shown)?);
                if hidden > 0 {
                    map.insert("entries_omitted".to_string(), Value::from(hidden));
                }
            } else {
                map.remove("entries");
            }
        }

        let text = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }
}

/// Formats reports for console output.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{color}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn status_symbol(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "✅",
        CheckStatus::Fail => "❌",
        CheckStatus::Error => "🚨",
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &ValidationReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let colors = config.use_colors;

        writeln!(output)?;
        if report.is_success() {
            writeln!(output, "✅ {}", paint("Validation PASSED", "32", colors))?;
        } else {
            writeln!(output, "❌ {}", paint("Validation FAILED", "31", colors))?;
        }
        writeln!(output)?;
        writeln!(output, "Run: {}", report.name)?;
        if config.include_timestamps {
            writeln!(output, "Timestamp: {}", report.timestamp)?;
        }

        if config.include_metrics {
            let m = &report.metrics;
            writeln!(output)?;
            writeln!(output, "📊 Summary:")?;
            writeln!(output, "   Fields: {}", m.total_fields)?;
            writeln!(output, "   Checks: {}", m.total_checks)?;
            writeln!(
                output,
                "   ✅ Passed: {}",
                paint(&m.passed_checks.to_string(), "32", colors)
            )?;
            writeln!(
                output,
                "   ❌ Failed: {}",
                paint(&m.failed_checks.to_string(), "31", colors)
            )?;
            writeln!(
                output,
                "   🚨 Errors: {}",
                paint(&m.errored_checks.to_string(), "33", colors)
            )?;
            writeln!(output, "   ⏭️  Skipped tags: {}", m.skipped_tags)?;
            writeln!(output, "   Success Rate: {:.1}%", m.success_rate())?;
            writeln!(output, "   Execution Time: {}ms", m.execution_time_ms)?;
        }

        let (shown, hidden) = config.select(report);
        if !shown.is_empty() {
            writeln!(output)?;
            writeln!(output, "🔍 Results:")?;
            for entry in &shown {
                writeln!(
                    output,
                    "   {} {} / {}: {}",
                    status_symbol(entry.status),
                    entry.field,
                    entry.check,
                    entry.evidence
                )?;
                if !entry.details.is_empty() {
                    writeln!(output, "      {}", entry.details)?;
                }
            }
            if hidden > 0 {
                writeln!(output, "   ... and {hidden} more entries")?;
            }
        }

        if config.include_skipped && !report.skipped.is_empty() {
            writeln!(output)?;
            writeln!(output, "⏭️  Not executed:")?;
            for skipped in &report.skipped {
                writeln!(output, "   {} / {}", skipped.field, skipped.tag)?;
            }
        }

        writeln!(output)?;
        Ok(output)
    }
}

/// Formats reports as Markdown.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the level of the top heading (clamped to 1..=4).
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 4);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

// Table cells cannot hold raw pipes or line breaks.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &ValidationReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let h = "#".repeat(self.heading_level as usize);

        if report.is_success() {
            writeln!(output, "{h} ✅ Validation Report - PASSED")?;
        } else {
            writeln!(output, "{h} ❌ Validation Report - FAILED")?;
        }
        writeln!(output)?;
        writeln!(output, "**Run:** {}", report.name)?;
        if config.include_timestamps {
            writeln!(output, "**Timestamp:** {}", report.timestamp)?;
        }

        if config.include_metrics {
            let m = &report.metrics;
            writeln!(output)?;
            writeln!(output, "{h}# Summary")?;
            writeln!(output)?;
            writeln!(output, "| Metric | Value |")?;
            writeln!(output, "|--------|-------|")?;
            writeln!(output, "| Fields | {} |", m.total_fields)?;
            writeln!(output, "| Checks | {} |", m.total_checks)?;
            writeln!(output, "| Passed | {} |", m.passed_checks)?;
            writeln!(output, "| Failed | {} |", m.failed_checks)?;
            writeln!(output, "| Errors | {} |", m.errored_checks)?;
            writeln!(output, "| Skipped tags | {} |", m.skipped_tags)?;
            writeln!(output, "| Success Rate | {:.1}% |", m.success_rate())?;
            writeln!(output, "| Execution Time | {}ms |", m.execution_time_ms)?;
        }

        let (shown, hidden) = config.select(report);
        if !shown.is_empty() {
            writeln!(output)?;
            writeln!(output, "{h}# Results")?;
            writeln!(output)?;
            writeln!(output, "| Field | Check | Status | Evidence | Details |")?;
            writeln!(output, "|-------|-------|--------|----------|---------|")?;
            for entry in &shown {
                writeln!(
                    output,
                    "| {} | {} | {} {} | {} | {} |",
                    cell(&entry.field),
                    cell(&entry.check),
                    status_symbol(entry.status),
                    entry.status,
                    cell(&entry.evidence),
                    cell(&entry.details)
                )?;
            }
            if hidden > 0 {
                writeln!(output)?;
                writeln!(
                    output,
                    "> **Note:** {hidden} additional entries not shown in this report."
                )?;
            }
        }

        if config.include_skipped && !report.skipped.is_empty() {
            writeln!(output)?;
            writeln!(output, "{h}# Not executed")?;
            writeln!(output)?;
            for skipped in &report.skipped {
                writeln!(output, "- `{}` on **{}**", skipped.tag, skipped.field)?;
            }
        }

        Ok(output)
    }
}
