//! Check result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The outcome category of a single check.
///
/// `Error` means the check could not be meaningfully executed (field missing,
/// column of the wrong type, malformed rule). It is distinct from `Fail`, which
/// means the rule was evaluated and the data violates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The rule is satisfied
    Pass,
    /// The rule was evaluated and found a violation
    Fail,
    /// The rule could not be evaluated
    Error,
}

impl CheckStatus {
    /// Returns true if this is a Pass status.
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }

    /// Returns true if this is a Fail status.
    pub fn is_fail(&self) -> bool {
        matches!(self, CheckStatus::Fail)
    }

    /// Returns true if this is an Error status.
    pub fn is_error(&self) -> bool {
        matches!(self, CheckStatus::Error)
    }

    /// Lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Error => "error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pass" => Ok(CheckStatus::Pass),
            "fail" => Ok(CheckStatus::Fail),
            "error" => Ok(CheckStatus::Error),
            other => Err(format!("Unknown check status: {other}")),
        }
    }
}

/// The normalized outcome of running one check against one field.
///
/// Results can only be built through the constructors below, which keep
/// `details` empty exactly when the status is `Pass`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    evidence: String,
    status: CheckStatus,
    details: String,
}

impl CheckResult {
    /// Creates a passing result.
    pub fn pass(evidence: impl Into<String>) -> Self {
        Self {
            evidence: evidence.into(),
            status: CheckStatus::Pass,
            details: String::new(),
        }
    }

    /// Creates a failing result. Details must name the first offender.
    pub fn fail(evidence: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            evidence: evidence.into(),
            status: CheckStatus::Fail,
            details: non_empty(details.into(), "rule violated"),
        }
    }

    /// Creates an error result for a check that could not be evaluated.
    pub fn error(evidence: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            evidence: evidence.into(),
            status: CheckStatus::Error,
            details: non_empty(details.into(), "check could not be evaluated"),
        }
    }

    /// Short summary for reports.
    pub fn evidence(&self) -> &str {
        &self.evidence
    }

    /// The outcome category.
    pub fn status(&self) -> CheckStatus {
        self.status
    }

    /// Diagnostic text; empty on pass.
    pub fn details(&self) -> &str {
        &self.details
    }

    /// Splits the result into its `(evidence, status, details)` triple.
    pub fn into_parts(self) -> (String, CheckStatus, String) {
        (self.evidence, self.status, self.details)
    }
}

fn non_empty(details: String, fallback: &str) -> String {
    if details.trim().is_empty() {
        fallback.to_string()
    } else {
        details
    }
}

/// Percentage of `part` over `whole`, zero when `whole` is empty.
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
