//! Parser for interval expressions of the form `de <min> a <max>`.
//!
//! The keywords are fixed and matched case-insensitively. Bounds accept
//! digits, dots and commas; dots are thousands separators and a comma is the
//! decimal separator, so `1.234,56` reads as `1234.56`.

use crate::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

/// Human-readable form of the accepted grammar, used in error messages.
pub const RANGE_FORMAT: &str = "de <min> a <max>";

static RANGE_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)^\s*de\s+([0-9.,]+)\s+a\s+([0-9.,]+)\s*$")
        .expect("Hard-coded regex pattern should be valid")
});

/// An inclusive numeric interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub lower: f64,
    pub upper: f64,
}

impl RangeSpec {
    /// Parses an interval expression.
    pub fn parse(expression: &str) -> Result<Self> {
        let captures = RANGE_GRAMMAR.captures(expression).ok_or_else(|| {
            EdaError::Parse(format!(
                "expected format '{RANGE_FORMAT}', got '{}'",
                expression.trim()
            ))
        })?;

        let lower = parse_localized_number(&captures[1])?;
        let upper = parse_localized_number(&captures[2])?;
        if lower > upper {
            return Err(EdaError::Parse(format!(
                "lower bound {lower} is greater than upper bound {upper}"
            )));
        }

        Ok(Self { lower, upper })
    }

    /// Returns true if `lower <= value <= upper`.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl FromStr for RangeSpec {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parses a number written with dot thousands separators and a comma decimal.
pub fn parse_localized_number(text: &str) -> Result<f64> {
    let normalized = text.replace('.', "").replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|e| EdaError::Parse(format!("invalid number '{text}': {e}")))
}
