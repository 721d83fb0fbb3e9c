//! What a sweep returns.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{ParamValue, RunConfig, SweepSchema};
use crate::report::Summary;
use crate::tag::Tag;

/// Why a run produced no (or only a partial) summary.
///
/// Recorded on the run, never raised: a failed run does not stop its sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunFailure {
    /// Inputs could not be prepared
    Dispatch { message: String },
    /// The engine could not be started
    SpawnFailed { message: String },
    /// The engine was killed at the deadline
    TimedOut,
    /// The engine exited without writing a report
    MissingReport {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// The engine wrote something that is not a report
    MalformedReport {
        exit_code: Option<i32>,
        stderr: String,
        message: String,
    },
    /// The sweep was cancelled before this run started
    Cancelled,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::Dispatch { message } => write!(f, "dispatch failed: {message}"),
            RunFailure::SpawnFailed { message } => write!(f, "engine did not start: {message}"),
            RunFailure::TimedOut => f.write_str("engine timed out"),
            RunFailure::MissingReport { exit_code, stderr } => {
                write!(f, "no report (exit code {exit_code:?})")?;
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            RunFailure::MalformedReport {
                exit_code, message, ..
            } => write!(f, "malformed report (exit code {exit_code:?}): {message}"),
            RunFailure::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// One point of a sweep and what came of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub config: RunConfig,
    pub tag: Tag,
    /// Empty when the run failed or its report had no numeric fields
    pub summary: Summary,
    pub exit_code: Option<i32>,
    pub failure: Option<RunFailure>,
}

impl RunRecord {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Configuration values of a run next to its summary fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub config: RunConfig,
    pub summary: Summary,
}

impl SummaryRow {
    #[must_use]
    pub fn value(&self, parameter: &str) -> Option<&ParamValue> {
        self.config.get(parameter)
    }

    /// Flat JSON object with the configuration values injected.
    ///
    /// Summary fields win on a name clash.
    #[must_use]
    pub fn merged(&self) -> Map<String, Value> {
        let mut out = self.config.to_json_map();
        for (field, mean) in &self.summary {
            out.insert(field.clone(), Value::from(*mean));
        }
        out
    }
}

/// Result of running one expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub name: String,
    pub schema: SweepSchema,
    /// Parameter names in declared order
    pub parameters: Vec<String>,
    pub varying: Option<String>,
    /// One record per configuration, in expansion order
    pub records: Vec<RunRecord>,
    pub finished: jiff::Timestamp,
}

impl SweepOutcome {
    /// Rows of the runs that produced at least one summary field.
    #[must_use]
    pub fn summaries(&self) -> Vec<SummaryRow> {
        self.records
            .iter()
            .filter(|r| !r.summary.is_empty())
            .map(|r| SummaryRow {
                config: r.config.clone(),
                summary: r.summary.clone(),
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(|r| r.failure.is_some())
    }

    /// Sorted union of summary field names.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .records
            .iter()
            .flat_map(|r| r.summary.keys().cloned())
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_row() {
        let row = SummaryRow {
            config: RunConfig::new([("delta", ParamValue::Float(0.5))]).unwrap(),
            summary: Summary::from([("t1".to_string(), 2.0)]),
        };
        let merged = row.merged();
        assert_eq!(merged["delta"], 0.5);
        assert_eq!(merged["t1"], 2.0);
    }

    #[test]
    fn test_failure_display() {
        let failure = RunFailure::MissingReport {
            exit_code: Some(139),
            stderr: "segfault".into(),
        };
        assert_eq!(failure.to_string(), "no report (exit code Some(139)): segfault");
    }
}
