//! Prelude for commonly used types and traits in eda-guard.

pub use crate::error::{EdaError, ErrorContext, Result};
pub use crate::logging::LogConfig;
