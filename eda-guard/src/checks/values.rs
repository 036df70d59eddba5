//! Enumerated allowed-values check.

use super::coercion::parse_decimal;
use super::{first_offender, guarded};
use crate::core::{percent, tags, CheckResult, Dataset, FieldDescriptor, FieldTable};
use crate::prelude::*;

/// The set of values a field may take.
///
/// Parsed from a pipe-delimited list when the expression contains `|`,
/// otherwise from a comma-delimited list. Surrounding brackets and per-item
/// quotes are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedValues {
    items: Vec<String>,
}

impl AllowedValues {
    pub fn parse(expression: &str) -> Result<Self> {
        let body = expression.trim();
        let body = strip_brackets(body);
        let delimiter = if body.contains('|') { '|' } else { ',' };

        let mut items: Vec<String> = Vec::new();
        for item in body.split(delimiter) {
            let item = item
                .trim()
                .trim_matches(|c: char| c == '"' || c == '\'')
                .trim();
            if !item.is_empty() && !items.iter().any(|known| known == item) {
                items.push(item.to_string());
            }
        }

        if items.is_empty() {
            return Err(EdaError::Parse(format!(
                "no allowed values found in '{}'",
                expression.trim()
            )));
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Exact match after trimming, or numeric equality when both sides parse.
    pub fn contains(&self, value: &str) -> bool {
        let value = value.trim();
        if self.items.iter().any(|item| item == value) {
            return true;
        }
        match parse_decimal(value) {
            Some(number) => self
                .items
                .iter()
                .filter_map(|item| parse_decimal(item))
                .any(|allowed| allowed == number),
            None => false,
        }
    }
}

fn strip_brackets(body: &str) -> &str {
    for (open, close) in [('[', ']'), ('(', ')'), ('{', '}')] {
        if let Some(inner) = body
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    body
}

/// Fails when a non-missing value is not in the field's allowed-values list.
pub fn check_values_list(
    dataset: &Dataset,
    _fields: &FieldTable,
    field: &FieldDescriptor,
) -> CheckResult {
    guarded(tags::VALUES, field, || {
        let expression = field
            .values()
            .ok_or_else(|| EdaError::invalid_rule(&field.field, "no allowed values set"))?;
        let allowed = AllowedValues::parse(expression)
            .map_err(|e| EdaError::invalid_rule(&field.field, e.to_string()))?;

        let column = dataset.column(&field.field)?;
        let mut checked = 0usize;
        let mut outside = 0usize;
        let mut first: Option<(usize, String)> = None;
        for (row, value) in column.texts()?.into_iter().enumerate() {
            let Some(value) = value else { continue };
            checked += 1;
            if !allowed.contains(&value) {
                outside += 1;
                first.get_or_insert((row, value));
            }
        }

        let Some((row, value)) = first else {
            return Ok(CheckResult::pass("Outside list: 0.00%"));
        };
        let pct = percent(outside, checked);
        Ok(CheckResult::fail(
            format!("Outside list: {pct:.2}%"),
            format!(
                "{outside} of {checked} values in '{}' not in [{}]; {}",
                column.name(),
                allowed.items().join(", "),
                first_offender(row, &value)
            ),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CheckStatus;
    use crate::test_helpers::{float_dataset, string_dataset, table_of};

    fn run(dataset: &Dataset, name: &str, values: &str) -> CheckResult {
        let field = FieldDescriptor::new(name, "string").with_values(values);
        check_values_list(dataset, &table_of(&field), &field)
    }

    #[test]
    fn test_parse_delimiters() {
        assert_eq!(
            AllowedValues::parse("A, B ,C").unwrap().items(),
            &["A", "B", "C"]
        );
        assert_eq!(
            AllowedValues::parse("1,5|2,5").unwrap().items(),
            &["1,5", "2,5"]
        );
        assert_eq!(
            AllowedValues::parse("['M', 'F', 'M']").unwrap().items(),
            &["M", "F"]
        );
        assert!(AllowedValues::parse(" | ").is_err());
        assert!(AllowedValues::parse(",,").is_err());
        assert!(AllowedValues::parse("[]").is_err());
    }

    #[test]
    fn test_contains_numeric_equivalence() {
        let allowed = AllowedValues::parse("1|2,5").unwrap();
        assert!(allowed.contains("1.0"));
        assert!(allowed.contains("2.5"));
        assert!(!allowed.contains("3"));
    }

    #[test]
    fn test_values_fail_reports_first_offender() {
        let dataset = string_dataset(
            "uf",
            vec![Some("SP"), None, Some("XX"), Some("RJ"), Some("YY")],
        );
        let result = run(&dataset, "uf", "SP, RJ, MG");
        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.evidence(), "Outside list: 50.00%");
        assert!(result.details().contains("row 4"));
        assert!(result.details().contains("'XX'"));
    }

    #[test]
    fn test_values_pass_on_float_column() {
        let dataset = float_dataset("rate", vec![Some(1.0), Some(2.0)]);
        let result = run(&dataset, "rate", "1|2|3");
        assert_eq!(result.status(), CheckStatus::Pass);
    }

    #[test]
    fn test_unparsable_list_is_error() {
        let dataset = string_dataset("uf", vec![Some("SP")]);
        let result = run(&dataset, "uf", " | ");
        assert_eq!(result.status(), CheckStatus::Error);
        assert_eq!(result.evidence(), "invalid rule");
    }
}
