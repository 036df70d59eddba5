//! Column-level checks and the registry that dispatches them by tag.
//!
//! Every check has the same signature, [`CheckFn`]: it receives the dataset,
//! the whole field table and the descriptor of the field under test, and
//! returns a [`CheckResult`]. Checks never mutate the dataset and never return
//! an error to their caller; anything that prevents evaluation becomes a
//! result with [`CheckStatus::Error`](crate::core::CheckStatus::Error).
//! The one exception is a missing column under `no-null`: an absent field is
//! reported as a presence failure rather than an evaluation error.
//!
//! | Tag           | Function                          |
//! |---------------|-----------------------------------|
//! | `no-null`     | [`check_null_empty`]              |
//! | `pk`          | [`check_primary_key`]             |
//! | `no-zero`     | [`check_zero`]                    |
//! | `no-negative` | [`check_negative`]                |
//! | `format`      | [`check_format`]                  |
//! | `range`       | [`check_range`]                   |
//! | `values`      | [`check_values_list`]             |
//!
//! # Examples
//!
//! ```rust
//! use eda_guard::checks::CheckRegistry;
//! use eda_guard::core::{Dataset, FieldDescriptor, FieldTable, CheckStatus};
//! use arrow::array::{ArrayRef, Int64Array};
//! use std::sync::Arc;
//!
//! let dataset = Dataset::from_columns(vec![
//!     ("qty", Arc::new(Int64Array::from(vec![3, 0, 7])) as ArrayRef),
//! ]).unwrap();
//! let field = FieldDescriptor::new("qty", "int").with_zero("no");
//! let table = FieldTable::new(vec![field.clone()]);
//!
//! let registry = CheckRegistry::standard();
//! let result = registry.run("no-zero", &dataset, &table, &field).unwrap();
//! assert_eq!(result.status(), CheckStatus::Fail);
//! assert_eq!(result.evidence(), "Zeroed: 33.33%");
//! ```

use crate::core::{sanitize_name, tags, CheckResult, Dataset, FieldDescriptor, FieldTable};
use crate::prelude::*;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

pub mod coercion;
mod completeness;
mod format;
mod numeric;
mod range;
pub mod range_spec;
mod uniqueness;
mod values;

pub use coercion::{coerce, parse_decimal, NumericColumn, NumericValue};
pub use completeness::check_null_empty;
pub use format::{anchor_pattern, check_format, NULL_TEXT};
pub use numeric::{check_negative, check_zero};
pub use range::check_range;
pub use range_spec::{parse_localized_number, RangeSpec};
pub use uniqueness::check_primary_key;
pub use values::{check_values_list, AllowedValues};

/// Evidence used when the field is absent from the dataset.
pub const FIELD_NOT_FOUND: &str = "field not found for check";
/// Evidence used when the column cannot be checked with the requested semantics.
pub const COULD_NOT_VALIDATE: &str = "could not validate";

/// The uniform signature shared by every check.
pub type CheckFn = fn(&Dataset, &FieldTable, &FieldDescriptor) -> CheckResult;

/// Maps check tags to check functions.
#[derive(Debug, Clone)]
pub struct CheckRegistry {
    checks: HashMap<String, CheckFn>,
}

impl CheckRegistry {
    /// Creates a registry with no checks.
    pub fn empty() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Creates a registry with every built-in check.
    pub fn standard() -> Self {
        Self::empty()
            .with_check(tags::NO_NULL, check_null_empty)
            .with_check(tags::PK, check_primary_key)
            .with_check(tags::NO_ZERO, check_zero)
            .with_check(tags::NO_NEGATIVE, check_negative)
            .with_check(tags::FORMAT, check_format)
            .with_check(tags::RANGE, check_range)
            .with_check(tags::VALUES, check_values_list)
    }

    /// Registers a check, returning the one it replaced.
    pub fn register(&mut self, tag: impl Into<String>, check: CheckFn) -> Option<CheckFn> {
        self.checks.insert(tag.into(), check)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_check(mut self, tag: impl Into<String>, check: CheckFn) -> Self {
        self.register(tag, check);
        self
    }

    /// Returns the check registered for `tag`.
    pub fn get(&self, tag: &str) -> Option<CheckFn> {
        self.checks.get(tag).copied()
    }

    /// Returns true if `tag` names an executable check.
    pub fn contains(&self, tag: &str) -> bool {
        self.checks.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Runs the check registered for `tag`, or returns `None` if there is none.
    ///
    /// A panic inside the check is reported as an error result.
    pub fn run(
        &self,
        tag: &str,
        dataset: &Dataset,
        fields: &FieldTable,
        field: &FieldDescriptor,
    ) -> Option<CheckResult> {
        let check = self.get(tag)?;
        let outcome = catch_unwind(AssertUnwindSafe(|| check(dataset, fields, field)));
        Some(outcome.unwrap_or_else(|_| {
            warn!(
                check.name = %tag,
                field.name = %field.field,
                "Check panicked"
            );
            CheckResult::error(
                "unexpected error",
                format!("check '{tag}' aborted while evaluating field '{}'", field.field),
            )
        }))
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Runs a check body, converting any error into an `error` result.
pub(crate) fn guarded<F>(check: &str, field: &FieldDescriptor, body: F) -> CheckResult
where
    F: FnOnce() -> Result<CheckResult>,
{
    match body() {
        Ok(result) => {
            debug!(
                check.name = %check,
                field.name = %field.field,
                result.status = %result.status(),
                result.evidence = %result.evidence(),
                "Check evaluated"
            );
            result
        }
        Err(err) => {
            debug!(
                check.name = %check,
                field.name = %field.field,
                error = %err,
                "Check could not be evaluated"
            );
            error_result(check, field, err)
        }
    }
}

fn error_result(check: &str, field: &FieldDescriptor, err: EdaError) -> CheckResult {
    match err {
        EdaError::ColumnNotFound { column } => {
            CheckResult::error(FIELD_NOT_FOUND, missing_column_details(&column))
        }
        EdaError::TypeMismatch { expected, found } => CheckResult::error(
            COULD_NOT_VALIDATE,
            format!(
                "field '{}' cannot be checked as {expected}; observed type: {found}",
                field.field
            ),
        ),
        EdaError::InvalidRule { field, message } => {
            CheckResult::error("invalid rule", format!("field '{field}': {message}"))
        }
        other => CheckResult::error(
            "unexpected error",
            format!("{check} on field '{}': {other}", field.field),
        ),
    }
}

/// Details for a descriptor whose column is absent from the dataset.
pub(crate) fn missing_column_details(column: &str) -> String {
    format!(
        "column '{column}' (sanitized to '{}') does not exist in the dataset",
        sanitize_name(column)
    )
}

/// Describes the first offending row for `fail` details.
pub(crate) fn first_offender(index: usize, value: &str) -> String {
    format!(
        "first occurrence at row {} (value: '{value}')",
        crate::core::reported_row_number(index)
    )
}
