//! Deterministic run tags.
//!
//! A tag names one point of a sweep. It doubles as a cache key and as the
//! stem of every file the run produces, so it must be stable across
//! processes and unique per configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{ParamValue, RunConfig, SweepSchema};

pub const SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tag for a run: the schema's fields, in the schema's order, joined by `-`.
pub fn tag(config: &RunConfig, schema: SweepSchema) -> Result<Tag, ConfigError> {
    join_fields(config, schema, schema.fields()).map(Tag)
}

/// Cache key of the geometry artifact a run needs.
pub fn geometry_key(config: &RunConfig, schema: SweepSchema) -> Result<String, ConfigError> {
    join_fields(config, schema, schema.geometry_fields())
}

fn join_fields(
    config: &RunConfig,
    schema: SweepSchema,
    fields: &[&str],
) -> Result<String, ConfigError> {
    let mut out = String::new();
    for (i, name) in fields.iter().enumerate() {
        let value = config
            .get(name)
            .ok_or_else(|| ConfigError::MissingParameter {
                name: (*name).to_string(),
                schema: schema.name(),
            })?;
        if i > 0 {
            out.push(SEPARATOR);
        }
        push_component(&mut out, value);
    }
    Ok(out)
}

/// One value rendered as a tag component. Safe to use as a file name stem.
#[must_use]
pub fn component(value: &ParamValue) -> String {
    let mut out = String::new();
    push_component(&mut out, value);
    out
}

/// Components never contain a bare `-` except as a number's leading sign,
/// and text never reads as a number.
///
/// Float exponents (`1e-7`) escape their sign like text does. Text escapes a
/// leading digit and the float spellings `inf` and `NaN`.
fn push_component(out: &mut String, value: &ParamValue) {
    match value {
        ParamValue::Text(s) if s.is_empty() => out.push('%'),
        ParamValue::Text(s) => {
            let numeric = s.starts_with(|c: char| c.is_ascii_digit()) || s == "inf" || s == "NaN";
            for (i, c) in s.chars().enumerate() {
                match c {
                    '%' => out.push_str("%25"),
                    '-' => out.push_str("%2D"),
                    '/' => out.push_str("%2F"),
                    '\\' => out.push_str("%5C"),
                    c if i == 0 && numeric => out.push_str(&format!("%{:02X}", u32::from(c))),
                    c => out.push(c),
                }
            }
        }
        number => {
            let rendered = number.to_string();
            let (sign, digits) = match rendered.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", rendered.as_str()),
            };
            out.push_str(sign);
            out.push_str(&digits.replace('-', "%2D"));
        }
    }
}
