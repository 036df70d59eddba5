//! Interval check driven by a `de <min> a <max>` expression.

use super::coercion::coerce;
use super::range_spec::RangeSpec;
use super::{first_offender, guarded};
use crate::core::{percent, tags, CheckResult, Dataset, FieldDescriptor, FieldTable};
use crate::prelude::*;

/// Fails when any numeric value lies outside the field's inclusive range.
///
/// Percentage, evidence label and verdict are all computed from the
/// out-of-range values.
pub fn check_range(dataset: &Dataset, _fields: &FieldTable, field: &FieldDescriptor) -> CheckResult {
    guarded(tags::RANGE, field, || {
        let expression = field
            .range()
            .ok_or_else(|| EdaError::invalid_rule(&field.field, "no range expression set"))?;
        let spec = RangeSpec::parse(expression)
            .map_err(|e| EdaError::invalid_rule(&field.field, e.to_string()))?;

        let column = dataset.column(&field.field)?;
        let coerced = coerce(&column)?;
        coerced.ensure_numeric()?;

        let outside = |value: f64| !spec.contains(value);
        let Some(first) = coerced.first_where(outside) else {
            return Ok(CheckResult::pass("Out of range: 0.00%"));
        };

        let out_of_range = coerced.count_where(outside);
        let pct = percent(out_of_range, coerced.numeric_count());
        Ok(CheckResult::fail(
            format!("Out of range: {pct:.2}%"),
            format!(
                "{out_of_range} of {} numeric values in '{}' outside [{}, {}]; {}",
                coerced.numeric_count(),
                column.name(),
                spec.lower,
                spec.upper,
                first_offender(first.row, &first.raw)
            ),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{parse_decimal, COULD_NOT_VALIDATE};
    use crate::core::CheckStatus;
    use crate::test_helpers::{int_dataset, string_dataset, table_of};

    fn run(dataset: &Dataset, name: &str, range: &str) -> CheckResult {
        let field = FieldDescriptor::new(name, "int").with_range(range);
        check_range(dataset, &table_of(&field), &field)
    }

    #[test]
    fn test_out_of_range_percentage_matches_verdict() {
        let dataset = int_dataset("score", vec![Some(5), Some(15), Some(25)]);
        let result = run(&dataset, "score", "de 10 a 20");

        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.evidence(), "Out of range: 66.67%");
        assert!(result.details().contains("2 of 3"));
        assert!(result.details().contains("row 2"));
        assert!(result.details().contains("'5'"));

        // The percentage counts values outside the bounds, never inside.
        let values = [5.0, 15.0, 25.0];
        let spec = RangeSpec::parse("de 10 a 20").unwrap();
        let inside = values.iter().filter(|v| spec.contains(**v)).count();
        assert_eq!(inside, 1);
        let shown = result
            .evidence()
            .trim_start_matches("Out of range: ")
            .trim_end_matches('%');
        let shown = parse_decimal(shown).unwrap();
        assert!((shown - (values.len() - inside) as f64 / 3.0 * 100.0).abs() < 0.01);
    }

    #[test]
    fn test_all_inside_passes() {
        let dataset = int_dataset("score", vec![Some(10), Some(20), None]);
        let result = run(&dataset, "score", "De 10 A 20");
        assert_eq!(result.status(), CheckStatus::Pass);
        assert_eq!(result.evidence(), "Out of range: 0.00%");
    }

    #[test]
    fn test_localized_bounds() {
        let dataset = string_dataset("price", vec![Some("1234,56"), Some("1500"), Some("999,99")]);
        let result = run(&dataset, "price", "de 1.000 a 1.234,56");
        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.evidence(), "Out of range: 66.67%");
        assert!(result.details().contains("row 3"));
    }

    #[test]
    fn test_malformed_range_is_error() {
        let dataset = int_dataset("score", vec![Some(5)]);
        let result = run(&dataset, "score", "between 1 and 2");
        assert_eq!(result.status(), CheckStatus::Error);
        assert!(result.details().contains("score"));
        assert!(result.details().contains("de <min> a <max>"));
    }

    #[test]
    fn test_text_column_is_error() {
        let dataset = string_dataset("name", vec![Some("Ana")]);
        let result = run(&dataset, "name", "de 1 a 2");
        assert_eq!(result.status(), CheckStatus::Error);
        assert_eq!(result.evidence(), COULD_NOT_VALIDATE);
    }
}
