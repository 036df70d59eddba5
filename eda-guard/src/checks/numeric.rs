//! Zero and negative value checks.
//!
//! Both coerce the column once and measure offenders against the count of
//! values that coerced successfully, so non-numeric noise neither inflates nor
//! dilutes the reported percentage.

use super::coercion::coerce;
use super::{first_offender, guarded};
use crate::core::{percent, tags, CheckResult, Dataset, FieldDescriptor, FieldTable};
use crate::prelude::*;

/// Fails when any numeric value equals zero.
pub fn check_zero(dataset: &Dataset, _fields: &FieldTable, field: &FieldDescriptor) -> CheckResult {
    guarded(tags::NO_ZERO, field, || {
        forbid_values(dataset, field, "Zeroed", "zero", |v| v == 0.0)
    })
}

/// Fails when any numeric value is below zero.
pub fn check_negative(
    dataset: &Dataset,
    _fields: &FieldTable,
    field: &FieldDescriptor,
) -> CheckResult {
    guarded(tags::NO_NEGATIVE, field, || {
        forbid_values(dataset, field, "Negatives", "negative", |v| v < 0.0)
    })
}

fn forbid_values(
    dataset: &Dataset,
    field: &FieldDescriptor,
    label: &str,
    noun: &str,
    forbidden: impl Fn(f64) -> bool,
) -> Result<CheckResult> {
    let column = dataset.column(&field.field)?;
    let coerced = coerce(&column)?;
    coerced.ensure_numeric()?;

    let Some(first) = coerced.first_where(&forbidden) else {
        return Ok(CheckResult::pass(format!("{label}: 0.00%")));
    };

    let offenders = coerced.count_where(&forbidden);
    let pct = percent(offenders, coerced.numeric_count());
    Ok(CheckResult::fail(
        format!("{label}: {pct:.2}%"),
        format!(
            "{offenders} {noun} value(s) among {} numeric values in '{}'; {}",
            coerced.numeric_count(),
            column.name(),
            first_offender(first.row, &first.raw)
        ),
    ))
}
