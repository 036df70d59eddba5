//! Field descriptors: the per-column rule metadata.

use super::dataset::{sanitize_name, Dataset};
use crate::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

/// Literal used by rule authors to mark an absent subtype.
pub const UNDEFINED_SUBTYPE: &str = "undefined";

/// Metadata describing which checks apply to one dataset column.
///
/// Every optional attribute is always present; absence is expressed as
/// `None` or blank text. `field` and `type` are required but deserialize
/// leniently so that a missing value surfaces as a configuration error from
/// [`FieldDescriptor::validate`] instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name in the dataset
    #[serde(default, deserialize_with = "lenient_string")]
    pub field: String,
    /// Declared type tag
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub field_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subtype: Option<String>,
    /// `"no"` forbids nulls and empty strings
    #[serde(rename = "null", default, deserialize_with = "lenient_text")]
    pub nullable: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pk: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fk: Option<String>,
    /// `"no"` forbids zero values
    #[serde(default, deserialize_with = "lenient_text")]
    pub zero: Option<String>,
    /// `"no"` forbids negative values
    #[serde(default, deserialize_with = "lenient_text")]
    pub negative: Option<String>,
    #[serde(alias = "format", default, deserialize_with = "lenient_text")]
    pub format_regex: Option<String>,
    /// Interval expression, `de <min> a <max>`
    #[serde(default, deserialize_with = "lenient_text")]
    pub range: Option<String>,
    /// Allowed values, comma- or pipe-delimited
    #[serde(default, deserialize_with = "lenient_text")]
    pub values: Option<String>,
}

impl FieldDescriptor {
    /// Creates a descriptor with only the required attributes set.
    pub fn new(field: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn with_null(mut self, flag: impl Into<String>) -> Self {
        self.nullable = Some(flag.into());
        self
    }

    pub fn with_pk(mut self, flag: impl Into<String>) -> Self {
        self.pk = Some(flag.into());
        self
    }

    pub fn with_fk(mut self, flag: impl Into<String>) -> Self {
        self.fk = Some(flag.into());
        self
    }

    pub fn with_zero(mut self, flag: impl Into<String>) -> Self {
        self.zero = Some(flag.into());
        self
    }

    pub fn with_negative(mut self, flag: impl Into<String>) -> Self {
        self.negative = Some(flag.into());
        self
    }

    pub fn with_format(mut self, pattern: impl Into<String>) -> Self {
        self.format_regex = Some(pattern.into());
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_values(mut self, values: impl Into<String>) -> Self {
        self.values = Some(values.into());
        self
    }

    /// Fails if a required attribute is blank.
    pub fn validate(&self) -> Result<()> {
        if self.field.trim().is_empty() {
            return Err(EdaError::invalid_descriptor(
                "<unnamed>",
                "attribute 'field' is required",
            ));
        }
        if self.field_type.trim().is_empty() {
            return Err(EdaError::invalid_descriptor(
                &self.field,
                "attribute 'type' is required",
            ));
        }
        Ok(())
    }

    /// The field name normalized for column lookup.
    pub fn sanitized_name(&self) -> String {
        sanitize_name(&self.field)
    }

    /// The subtype, unless blank or the literal `undefined`.
    pub fn subtype(&self) -> Option<&str> {
        non_blank(&self.subtype).filter(|s| !s.eq_ignore_ascii_case(UNDEFINED_SUBTYPE))
    }

    pub fn format_regex(&self) -> Option<&str> {
        non_blank(&self.format_regex)
    }

    pub fn range(&self) -> Option<&str> {
        non_blank(&self.range)
    }

    pub fn values(&self) -> Option<&str> {
        non_blank(&self.values)
    }
}

/// Returns the trimmed content, or `None` when missing or whitespace-only.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Compares a yes/no flag case-insensitively; booleans map to yes/no.
pub fn flag_is(value: &Option<String>, expected: &str) -> bool {
    match non_blank(value).map(str::to_lowercase).as_deref() {
        Some("true") => expected.eq_ignore_ascii_case("yes"),
        Some("false") => expected.eq_ignore_ascii_case("no"),
        Some(flag) => flag.eq_ignore_ascii_case(expected),
        None => false,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Bool(true)) => Some("yes".to_string()),
        Some(Value::Bool(false)) => Some("no".to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_text(deserializer).map(Option::unwrap_or_default)
}

/// The ordered collection of field descriptors for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldTable {
    fields: Vec<FieldDescriptor>,
}

impl FieldTable {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    /// Looks up a descriptor by field name, case- and whitespace-insensitively.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        let wanted = sanitize_name(name);
        self.fields.iter().find(|f| f.sanitized_name() == wanted)
    }

    /// Builds the table from a tabular rule sheet.
    ///
    /// Columns are matched by name like dataset columns. `field` and `type`
    /// columns are mandatory; the rule column may be named `format_regex` or
    /// `format`. Cells are read through their text rendering, so numeric or
    /// boolean cells are accepted.
    pub fn from_dataset(sheet: &Dataset) -> Result<Self> {
        let required = |name: &str| -> Result<Vec<Option<String>>> {
            sheet
                .column(name)
                .map_err(|_| {
                    EdaError::Configuration(format!(
                        "field table has no '{name}' column (found: {})",
                        sheet.column_names().join(", ")
                    ))
                })?
                .texts()
        };
        let optional = |names: &[&str]| -> Result<Vec<Option<String>>> {
            for name in names {
                if let Ok(column) = sheet.column(name) {
                    return column.texts();
                }
            }
            Ok(vec![None; sheet.num_rows()])
        };

        let field = required("field")?;
        let field_type = required("type")?;
        let subtype = optional(&["subtype"])?;
        let nullable = optional(&["null"])?;
        let pk = optional(&["pk"])?;
        let fk = optional(&["fk"])?;
        let zero = optional(&["zero"])?;
        let negative = optional(&["negative"])?;
        let format_regex = optional(&["format_regex", "format"])?;
        let range = optional(&["range"])?;
        let values = optional(&["values"])?;

        let fields = (0..sheet.num_rows())
            .map(|row| FieldDescriptor {
                field: field[row].clone().unwrap_or_default(),
                field_type: field_type[row].clone().unwrap_or_default(),
                subtype: subtype[row].clone(),
                nullable: nullable[row].clone(),
                pk: pk[row].clone(),
                fk: fk[row].clone(),
                zero: zero[row].clone(),
                negative: negative[row].clone(),
                format_regex: format_regex[row].clone(),
                range: range[row].clone(),
                values: values[row].clone(),
            })
            .collect();

        Ok(Self { fields })
    }
}

impl From<Vec<FieldDescriptor>> for FieldTable {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        Self::new(fields)
    }
}

impl<'a> IntoIterator for &'a FieldTable {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
