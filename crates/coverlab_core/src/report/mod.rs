//! Engine reports and their aggregation.
//!
//! Reports come in a flat form (a list of trial records) and a sectioned form
//! (`{"discrete": [...], "continuous": [...]}`). Both are normalized on load so
//! that field names from older engine builds match the current ones.

mod aggregate;
mod model;

use std::path::Path;

pub use aggregate::{Derivation, DerivedField, Summary, aggregate};
pub use model::{Report, Trial, load_report, normalize_key};

use crate::error::ReportError;

/// Load the report at `path` and aggregate it.
pub fn summarize(path: &Path, rules: &[DerivedField]) -> Result<Summary, ReportError> {
    let report = load_report(path)?;
    Ok(aggregate(&report, rules))
}
