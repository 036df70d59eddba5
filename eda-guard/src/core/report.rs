//! Validation report types.

use super::result::{CheckResult, CheckStatus};
use serde::Serialize;

/// Metrics collected during a validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportMetrics {
    /// Number of field descriptors processed
    pub total_fields: usize,
    /// Number of checks executed
    pub total_checks: usize,
    /// Number of checks that passed
    pub passed_checks: usize,
    /// Number of checks that found a violation
    pub failed_checks: usize,
    /// Number of checks that could not be evaluated
    pub errored_checks: usize,
    /// Number of resolved tags with no executable check
    pub skipped_tags: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
}

impl ReportMetrics {
    /// Returns the pass rate as a percentage (0.0 to 100.0).
    pub fn success_rate(&self) -> f64 {
        if self.total_checks == 0 {
            100.0
        } else {
            (self.passed_checks as f64 / self.total_checks as f64) * 100.0
        }
    }
}

/// One `(field, check)` outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub field: String,
    pub check: String,
    pub evidence: String,
    pub status: CheckStatus,
    pub details: String,
}

/// A resolved tag that has no executable check (type tags, `fk`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTag {
    pub field: String,
    pub tag: String,
}

/// The outcome of validating a dataset against a field table.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Name of the run, usually the dataset file name
    pub name: String,
    /// Timestamp when the validation was run (RFC 3339)
    pub timestamp: String,
    pub metrics: ReportMetrics,
    /// Check outcomes in field order, then resolver order
    pub entries: Vec<ReportEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedTag>,
}

impl ValidationReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            metrics: ReportMetrics::default(),
            entries: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Appends a check outcome and updates the metrics.
    pub fn record(&mut self, field: &str, check: &str, result: CheckResult) {
        self.metrics.total_checks += 1;
        match result.status() {
            CheckStatus::Pass => self.metrics.passed_checks += 1,
            CheckStatus::Fail => self.metrics.failed_checks += 1,
            CheckStatus::Error => self.metrics.errored_checks += 1,
        }
        let (evidence, status, details) = result.into_parts();
        self.entries.push(ReportEntry {
            field: field.to_string(),
            check: check.to_string(),
            evidence,
            status,
            details,
        });
    }

    /// Notes a tag that was resolved but not executed.
    pub fn skip(&mut self, field: &str, tag: &str) {
        self.metrics.skipped_tags += 1;
        self.skipped.push(SkippedTag {
            field: field.to_string(),
            tag: tag.to_string(),
        });
    }

    /// True when every executed check passed.
    pub fn is_success(&self) -> bool {
        self.metrics.failed_checks == 0 && self.metrics.errored_checks == 0
    }

    /// Entries with the given status.
    pub fn entries_with_status(&self, status: CheckStatus) -> Vec<&ReportEntry> {
        self.entries.iter().filter(|e| e.status == status).collect()
    }

    /// Entries for one field, case- and whitespace-insensitively.
    pub fn entries_for_field(&self, field: &str) -> Vec<&ReportEntry> {
        let wanted = super::sanitize_name(field);
        self.entries
            .iter()
            .filter(|e| super::sanitize_name(&e.field) == wanted)
            .collect()
    }
}
