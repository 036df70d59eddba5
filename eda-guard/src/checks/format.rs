//! Regular-expression format check.

use super::{first_offender, guarded};
use crate::core::{percent, tags, CheckResult, Dataset, FieldDescriptor, FieldTable};
use crate::prelude::*;
use regex::Regex;

/// Text that missing values are rendered as before matching.
pub const NULL_TEXT: &str = "nan";

/// Anchors `pattern` at both ends unless it already is.
pub fn anchor_pattern(pattern: &str) -> String {
    let mut anchored = String::with_capacity(pattern.len() + 2);
    if !pattern.starts_with('^') {
        anchored.push('^');
    }
    anchored.push_str(pattern);
    if !pattern.ends_with('$') {
        anchored.push('$');
    }
    anchored
}

/// Fails when any value does not match the field's pattern over its whole text.
///
/// Missing values are matched as [`NULL_TEXT`], so they fail unless the
/// pattern accepts that literal.
pub fn check_format(dataset: &Dataset, _fields: &FieldTable, field: &FieldDescriptor) -> CheckResult {
    guarded(tags::FORMAT, field, || {
        let pattern = field
            .format_regex
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| EdaError::invalid_rule(&field.field, "no format pattern set"))?;
        let anchored = anchor_pattern(pattern);
        // Wrapping keeps alternations such as `^a|b$` from matching a prefix.
        let regex = Regex::new(&format!("^(?:{anchored})$")).map_err(|e| {
            EdaError::invalid_rule(
                &field.field,
                format!("invalid regular expression '{anchored}': {e}"),
            )
        })?;

        let column = dataset.column(&field.field)?;
        let mut mismatches = 0usize;
        let mut first: Option<(usize, String)> = None;
        for (row, value) in column.texts()?.into_iter().enumerate() {
            let text = value.unwrap_or_else(|| NULL_TEXT.to_string());
            if !regex.is_match(&text) {
                mismatches += 1;
                first.get_or_insert((row, text));
            }
        }

        let rows = dataset.num_rows();
        let compatible = if rows == 0 {
            100.0
        } else {
            percent(rows - mismatches, rows)
        };

        let Some((row, value)) = first else {
            return Ok(CheckResult::pass(format!("Compatible: {compatible:.2}%")));
        };
        Ok(CheckResult::fail(
            format!("Compatible: {compatible:.2}%"),
            format!(
                "{mismatches} of {rows} values in '{}' do not match '{anchored}'; {}",
                column.name(),
                first_offender(row, &value)
            ),
        ))
    })
}
