//! Argument parsing and output helpers for the `coverlab` binary.

use color_eyre::eyre::{bail, eyre};
use serde_json::{Value, json};

use coverlab_core::{ParamValue, RunConfig, SweepOutcome, SweepSchema};

/// Parse a schema name as accepted on the command line.
pub fn parse_schema(s: &str) -> Result<SweepSchema, String> {
    match s {
        "query" => Ok(SweepSchema::Query),
        "coverage" => Ok(SweepSchema::Coverage),
        other => Err(format!("unknown schema `{other}` (expected query or coverage)")),
    }
}

/// Parse a literal the way a plan would: integer, then float, then text.
#[must_use]
pub fn parse_value(s: &str) -> ParamValue {
    if let Ok(v) = s.parse::<i64>() {
        ParamValue::Int(v)
    } else if let Ok(v) = s.parse::<f64>()
        && v.is_finite()
    {
        ParamValue::Float(v)
    } else {
        ParamValue::from(s)
    }
}

/// Build a canonical configuration from `key=value` arguments.
pub fn parse_assignments(args: &[String], schema: SweepSchema) -> color_eyre::Result<RunConfig> {
    let mut pairs = Vec::with_capacity(args.len());
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("expected key=value, got `{arg}`");
        };
        let name = schema.canonical_name(key.trim()).ok_or_else(|| {
            eyre!(
                "`{key}` is not a {} parameter (expected one of {})",
                schema.name(),
                schema.fields().join(", ")
            )
        })?;
        pairs.push((name, parse_value(value.trim())));
    }
    Ok(RunConfig::new(pairs)?)
}

/// JSON view of persisted outcomes: one object per sweep with merged rows.
#[must_use]
pub fn outcomes_json(outcomes: &[SweepOutcome]) -> Value {
    Value::Array(
        outcomes
            .iter()
            .map(|outcome| {
                let rows: Vec<Value> = outcome
                    .summaries()
                    .iter()
                    .map(|row| Value::Object(row.merged()))
                    .collect();
                json!({
                    "name": outcome.name,
                    "schema": outcome.schema,
                    "finished": outcome.finished,
                    "varying": outcome.varying,
                    "runs": outcome.records.len(),
                    "failed": outcome.failures().count(),
                    "rows": rows,
                })
            })
            .collect(),
    )
}

/// One line per sweep for the terminal.
#[must_use]
pub fn outcome_line(outcome: &SweepOutcome) -> String {
    let failed = outcome.failures().count();
    let mut line = format!(
        "{}: {} runs, {} succeeded, {} failed",
        outcome.name,
        outcome.records.len(),
        outcome.records.len() - failed,
        failed
    );
    if let Some(varying) = &outcome.varying {
        line.push_str(&format!(" (varying {varying})"));
    }
    line
}
