//! Runs every resolved check for every field descriptor.

use super::report::ValidationReport;
use super::resolver::resolve;
use super::{Dataset, FieldTable};
use crate::checks::CheckRegistry;
use crate::logging::{truncate_field, LogConfig};
use crate::prelude::*;
use std::time::Instant;
use tracing::{info, instrument};

/// Iterates fields × resolved tags and collects a [`ValidationReport`].
///
/// # Examples
///
/// ```rust
/// use eda_guard::core::{Dataset, FieldDescriptor, FieldTable, Validator};
/// use arrow::array::{ArrayRef, StringArray};
/// use std::sync::Arc;
///
/// let dataset = Dataset::from_columns(vec![
///     ("uf", Arc::new(StringArray::from(vec!["SP", "RJ", "X"])) as ArrayRef),
/// ]).unwrap();
/// let fields = FieldTable::new(vec![
///     FieldDescriptor::new("uf", "string").with_null("no").with_format("[A-Z]{2}"),
/// ]);
///
/// let report = Validator::new().validate("states", &dataset, &fields).unwrap();
/// assert_eq!(report.metrics.total_checks, 2);
/// assert_eq!(report.metrics.failed_checks, 1);
/// assert_eq!(report.metrics.skipped_tags, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    registry: CheckRegistry,
    log_config: LogConfig,
}

impl Validator {
    /// Creates a validator with the standard check registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: CheckRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Validates `dataset` against every descriptor in `fields`.
    ///
    /// Fails only when a descriptor is malformed; individual checks always
    /// produce a report entry.
    #[instrument(skip(self, dataset, fields), fields(
        run.name = %name,
        dataset.rows = dataset.num_rows(),
        fields.count = fields.len()
    ))]
    pub fn validate(
        &self,
        name: &str,
        dataset: &Dataset,
        fields: &FieldTable,
    ) -> Result<ValidationReport> {
        let start = Instant::now();
        let mut report = ValidationReport::new(name);

        crate::log_data_op!(
            self.log_config,
            run.name = %name,
            dataset.rows = dataset.num_rows(),
            dataset.columns = dataset.num_columns(),
            fields.count = fields.len(),
            "Starting validation run"
        );

        for field in fields {
            let applied = resolve(field)?;
            report.metrics.total_fields += 1;
            crate::log_check!(
                self.log_config,
                field.name = %field.field,
                checks = ?applied,
                "Resolved checks for field"
            );

            // The type and subtype describe the field; they never name a check,
            // even when the text coincides with a registered tag.
            let descriptive = if field.subtype().is_some() { 2 } else { 1 };
            let (described, rules) = applied.split_at(descriptive.min(applied.len()));
            for tag in described {
                report.skip(&field.field, tag);
            }

            for tag in rules {
                match self.registry.run(tag, dataset, fields, field) {
                    Some(result) => {
                        crate::log_check!(
                            self.log_config,
                            field.name = %field.field,
                            check.name = %tag,
                            result.status = %result.status(),
                            result.details = %truncate_field(result.details(), self.log_config.max_field_length),
                            "Check finished"
                        );
                        report.record(&field.field, tag, result);
                    }
                    None => {
                        crate::perf_debug!(
                            self.log_config,
                            field.name = %field.field,
                            check.tag = %tag,
                            "No executable check for tag"
                        );
                        report.skip(&field.field, tag);
                    }
                }
            }
        }

        report.metrics.execution_time_ms = start.elapsed().as_millis() as u64;
        info!(
            run.name = %name,
            checks.total = report.metrics.total_checks,
            checks.passed = report.metrics.passed_checks,
            checks.failed = report.metrics.failed_checks,
            checks.errored = report.metrics.errored_checks,
            run.duration_ms = report.metrics.execution_time_ms,
            "Validation run finished"
        );
        Ok(report)
    }
}
