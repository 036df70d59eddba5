//! Primary-key check: no missing keys and no repeated keys.

use super::{first_offender, guarded};
use crate::core::{percent, tags, CheckResult, Dataset, FieldDescriptor, FieldTable};
use std::collections::HashSet;

/// Fails when the key column has missing values or duplicates.
///
/// Keys are compared on their text rendering. The first offender is the
/// first missing key or the first repeat of an earlier key, whichever comes
/// first in row order.
pub fn check_primary_key(
    dataset: &Dataset,
    _fields: &FieldTable,
    field: &FieldDescriptor,
) -> CheckResult {
    guarded(tags::PK, field, || {
        let column = dataset.column(&field.field)?;
        let mut seen = HashSet::new();
        let mut nulls = 0usize;
        let mut duplicates = 0usize;
        let mut first: Option<(usize, String)> = None;

        for (row, value) in column.texts()?.into_iter().enumerate() {
            match value {
                None => {
                    nulls += 1;
                    first.get_or_insert((row, "null".to_string()));
                }
                Some(key) => {
                    if seen.contains(&key) {
                        duplicates += 1;
                        first.get_or_insert((row, key));
                    } else {
                        seen.insert(key);
                    }
                }
            }
        }

        let Some((row, value)) = first else {
            return Ok(CheckResult::pass("Unique: 100.00%"));
        };

        let rows = dataset.num_rows();
        let evidence = if duplicates > 0 {
            format!(
                "Duplicates: {duplicates} ({:.2}%)",
                percent(duplicates, rows)
            )
        } else {
            format!("{nulls} null keys")
        };
        Ok(CheckResult::fail(
            evidence,
            format!(
                "'{}' is not a valid key [duplicates: {duplicates}, nulls: {nulls}]; {}",
                column.name(),
                first_offender(row, &value)
            ),
        ))
    })
}
