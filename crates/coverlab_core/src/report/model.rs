//! Engine report documents and the legacy field-name shim.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ReportError;

/// One trial record after normalization. `None` marks a null trial.
pub type Trial = Option<Map<String, Value>>;

/// Objects whose entries are hoisted into the enclosing trial.
const TIMER_KEYS: [&str; 2] = ["timestamp", "timer"];

/// List fields of a single trial. An object carrying one is a trial, never a
/// section mapping.
const TRIAL_LIST_KEYS: [&str; 5] = [
    "result_scenes",
    "possible_scenes",
    "scenes",
    "cells",
    "offcuts",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// A list of trials
    Flat(Vec<Trial>),
    /// Section name to list of trials, ordered by section name
    Sectioned(Vec<(String, Vec<Trial>)>),
}

impl Report {
    /// Interpret a parsed report document.
    ///
    /// An object whose values are all lists of trial objects (or nulls) is
    /// sectioned, unless one of its keys is a trial's own list field. Any
    /// other object is a single trial.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Null => Ok(Report::Flat(Vec::new())),
            Value::Array(items) => Ok(Report::Flat(trials(items))),
            Value::Object(map) if is_section_mapping(&map) => {
                let sections = map
                    .into_iter()
                    .map(|(name, items)| {
                        let items = match items {
                            Value::Array(items) => items,
                            _ => Vec::new(),
                        };
                        (normalize_key(&name), trials(items))
                    })
                    .collect();
                Ok(Report::Sectioned(sections))
            }
            Value::Object(map) => Ok(Report::Flat(vec![Some(normalize_trial(map))])),
            other => Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "expected a list of trials or a section mapping, found {other}"
            ))),
        }
    }

    /// Number of non-null trials across all sections.
    #[must_use]
    pub fn trial_count(&self) -> usize {
        match self {
            Report::Flat(trials) => trials.iter().flatten().count(),
            Report::Sectioned(sections) => sections
                .iter()
                .map(|(_, trials)| trials.iter().flatten().count())
                .sum(),
        }
    }
}

/// Load and normalize the report at `path`.
pub fn load_report(path: &Path) -> Result<Report, ReportError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReportError::Missing(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ReportError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let malformed = |source| ReportError::Malformed {
        path: path.to_path_buf(),
        source,
    };
    let value: Value = serde_json::from_str(&text).map_err(malformed)?;
    Report::from_value(value).map_err(malformed)
}

fn is_section_mapping(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.iter().all(|(key, value)| {
            !TRIAL_LIST_KEYS.contains(&normalize_key(key).as_str())
                && value.as_array().is_some_and(|items| {
                    items.iter().all(|item| item.is_object() || item.is_null())
                })
        })
}

fn trials(items: Vec<Value>) -> Vec<Trial> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Some(normalize_trial(map)),
            _ => None,
        })
        .collect()
}

/// Canonicalize keys at every depth and hoist timer objects into the trial.
pub fn normalize_trial(map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    let mut hoisted = Vec::new();
    for (key, value) in map {
        let key = normalize_key(&key);
        match value {
            Value::Object(inner) if TIMER_KEYS.contains(&key.as_str()) => {
                hoisted.extend(normalize_object(inner));
            }
            value => {
                out.insert(key, normalize_value(value));
            }
        }
    }
    for (key, value) in hoisted {
        out.entry(key).or_insert(value);
    }
    out
}

fn normalize_object(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (normalize_key(&k), normalize_value(v)))
        .collect()
}

fn normalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_object(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        other => other,
    }
}

/// Map a legacy key to its canonical snake_case name.
///
/// `resultScenes` becomes `result_scenes`, `cost` becomes `price`, `grids`
/// becomes `cells`, and `aoi`/`roi` words become `region`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let snake = to_snake_case(key);
    snake
        .split('_')
        .map(|word| match word {
            "cost" => "price",
            "costs" => "prices",
            "grids" => "cells",
            "grid" => "cell",
            "aoi" | "roi" => "region",
            "aois" | "rois" => "regions",
            other => other,
        })
        .collect::<Vec<_>>()
        .join("_")
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}
