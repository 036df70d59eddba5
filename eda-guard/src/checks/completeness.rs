//! Presence check: nulls and, for text columns, empty strings.

use super::{first_offender, guarded, missing_column_details, FIELD_NOT_FOUND};
use crate::core::{percent, tags, CheckResult, Dataset, FieldDescriptor, FieldTable};
use crate::error::EdaError;

/// Fails when the column holds null values or, for text columns, values that
/// are empty after trimming.
///
/// A field that is not in the dataset at all fails with
/// [`FIELD_NOT_FOUND`] instead of producing an `error` result.
pub fn check_null_empty(
    dataset: &Dataset,
    _fields: &FieldTable,
    field: &FieldDescriptor,
) -> CheckResult {
    guarded(tags::NO_NULL, field, || {
        let column = match dataset.column(&field.field) {
            Ok(column) => column,
            Err(EdaError::ColumnNotFound { column }) => {
                return Ok(CheckResult::fail(
                    FIELD_NOT_FOUND,
                    missing_column_details(&column),
                ));
            }
            Err(err) => return Err(err),
        };
        let check_empty = column.is_text();

        let mut nulls = 0usize;
        let mut empties = 0usize;
        let mut first: Option<(usize, String)> = None;

        for (row, value) in column.texts()?.iter().enumerate() {
            let offender = match value {
                None => {
                    nulls += 1;
                    Some("null")
                }
                Some(text) if check_empty && text.trim().is_empty() => {
                    empties += 1;
                    Some(text.as_str())
                }
                Some(_) => None,
            };
            if let Some(shown) = offender {
                first.get_or_insert_with(|| (row, shown.to_string()));
            }
        }

        let total_missing = nulls + empties;
        let Some((row, value)) = first else {
            return Ok(CheckResult::pass("0 absences"));
        };

        let pct = percent(total_missing, dataset.num_rows());
        Ok(CheckResult::fail(
            format!("{total_missing} absences ({pct:.2}%)"),
            format!(
                "{total_missing} missing value(s) ({pct:.2}%) [nulls: {nulls}, empty/whitespace: {empties}]; {}",
                first_offender(row, &value)
            ),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CheckStatus;
    use crate::test_helpers::{int_dataset, string_dataset, table_of};

    fn run(dataset: &Dataset, name: &str) -> CheckResult {
        let field = FieldDescriptor::new(name, "string").with_null("no");
        check_null_empty(dataset, &table_of(&field), &field)
    }

    #[test]
    fn test_complete_column_passes() {
        let dataset = string_dataset("name", vec![Some("Ana"), Some("Bia")]);
        let result = run(&dataset, "name");
        assert_eq!(result.status(), CheckStatus::Pass);
        assert_eq!(result.evidence(), "0 absences");
        assert!(result.details().is_empty());
    }

    #[test]
    fn test_nulls_and_blanks_are_summed() {
        let dataset = string_dataset(
            "name",
            vec![Some("Ana"), None, Some("   "), Some(""), Some("Bia"), None],
        );
        let result = run(&dataset, "NAME ");
        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.evidence(), "4 absences (66.67%)");
        assert!(result.details().contains("nulls: 2"));
        assert!(result.details().contains("empty/whitespace: 2"));
        assert!(result.details().contains("row 3"));
    }

    #[test]
    fn test_numeric_column_counts_only_nulls() {
        let dataset = int_dataset("qty", vec![Some(1), None, Some(3), Some(4)]);
        let result = run(&dataset, "qty");
        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.evidence(), "1 absences (25.00%)");
        assert!(result.details().contains("empty/whitespace: 0"));
    }

    #[test]
    fn test_missing_field_fails() {
        let dataset = string_dataset("name", vec![Some("Ana")]);
        let result = run(&dataset, "Email");
        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.evidence(), FIELD_NOT_FOUND);
        assert!(result.details().contains("'Email'"));
        assert!(result.details().contains("'email'"));
    }
}
