//! Derives the ordered list of check tags for a field descriptor.
//!
//! The order below is part of the report contract and must not change:
//!
//! 1. the declared `type` (always present)
//! 2. the `subtype`, unless blank or `undefined`
//! 3. `no-null` when `null == "no"`
//! 4. `pk` when `pk == "yes"`
//! 5. `fk` when `fk == "yes"`
//! 6. `no-zero` when `zero == "no"`
//! 7. `no-negative` when `negative == "no"`
//! 8. `format` when a regex is set
//! 9. `range` when a range expression is set
//! 10. `values` when an allowed-values list is set

use super::field::{flag_is, FieldDescriptor};
use crate::prelude::*;

/// Tag names produced by the resolver and understood by the check registry.
pub mod tags {
    pub const NO_NULL: &str = "no-null";
    pub const PK: &str = "pk";
    pub const FK: &str = "fk";
    pub const NO_ZERO: &str = "no-zero";
    pub const NO_NEGATIVE: &str = "no-negative";
    pub const FORMAT: &str = "format";
    pub const RANGE: &str = "range";
    pub const VALUES: &str = "values";
}

/// Returns the check tags that apply to `field`, in report order.
///
/// Fails with [`EdaError::InvalidFieldDescriptor`] when `field` or `type` is
/// blank; no partial list is ever returned.
pub fn resolve(field: &FieldDescriptor) -> Result<Vec<String>> {
    field.validate()?;

    let mut applied = vec![field.field_type.trim().to_string()];

    if let Some(subtype) = field.subtype() {
        applied.push(subtype.to_string());
    }

    let guarded = [
        (flag_is(&field.nullable, "no"), tags::NO_NULL),
        (flag_is(&field.pk, "yes"), tags::PK),
        (flag_is(&field.fk, "yes"), tags::FK),
        (flag_is(&field.zero, "no"), tags::NO_ZERO),
        (flag_is(&field.negative, "no"), tags::NO_NEGATIVE),
        (field.format_regex().is_some(), tags::FORMAT),
        (field.range().is_some(), tags::RANGE),
        (field.values().is_some(), tags::VALUES),
    ];
    applied.extend(
        guarded
            .into_iter()
            .filter(|(applies, _)| *applies)
            .map(|(_, tag)| tag.to_string()),
    );

    Ok(applied)
}
