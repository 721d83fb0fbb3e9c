//! Reduction of per-trial reports to scalar means.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::model::{Report, Trial};

/// Field name to mean over trials, sorted by name.
pub type Summary = BTreeMap<String, f64>;

/// How a derived field is computed from one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Derivation {
    /// Sum of `field` over the objects of the list `list`
    Sum { list: String, field: String },
    /// Length of the list `list`
    Count { list: String },
    /// `numerator / denominator`; trials with a zero denominator are skipped
    Ratio {
        numerator: String,
        denominator: String,
    },
}

/// A derivation and the summary field it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedField {
    pub name: String,
    pub rule: Derivation,
}

impl DerivedField {
    pub fn new(name: impl Into<String>, rule: Derivation) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }

    /// Rules applied when none are configured.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "price",
                Derivation::Sum {
                    list: "result_scenes".into(),
                    field: "price".into(),
                },
            ),
            Self::new(
                "result_scene_count",
                Derivation::Count {
                    list: "result_scenes".into(),
                },
            ),
            Self::new(
                "possible_scene_count",
                Derivation::Count {
                    list: "possible_scenes".into(),
                },
            ),
        ]
    }
}

/// Aggregate a report into per-field means.
///
/// Sections are aggregated independently and their fields prefixed with
/// `<section>_`.
#[must_use]
pub fn aggregate(report: &Report, rules: &[DerivedField]) -> Summary {
    match report {
        Report::Flat(trials) => aggregate_trials(trials, rules),
        Report::Sectioned(sections) => sections
            .iter()
            .flat_map(|(section, trials)| {
                aggregate_trials(trials, rules)
                    .into_iter()
                    .map(move |(field, mean)| (format!("{section}_{field}"), mean))
            })
            .collect(),
    }
}

/// Mean of every numeric field of the first non-null trial, over the
/// non-null trials that carry it. Derived fields present in any trial are
/// included too.
fn aggregate_trials(trials: &[Trial], rules: &[DerivedField]) -> Summary {
    let rows: Vec<BTreeMap<String, f64>> = trials
        .iter()
        .flatten()
        .map(|trial| numeric_row(trial, rules))
        .collect();
    let Some(first) = rows.first() else {
        return Summary::new();
    };

    let mut fields: Vec<&str> = first.keys().map(String::as_str).collect();
    for rule in rules {
        if !first.contains_key(&rule.name) && rows.iter().any(|r| r.contains_key(&rule.name)) {
            fields.push(&rule.name);
        }
    }

    fields
        .into_iter()
        .filter_map(|field| {
            let (sum, n) = rows
                .iter()
                .filter_map(|row| row.get(field))
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            (n > 0).then(|| (field.to_string(), sum / n as f64))
        })
        .collect()
}

/// Direct numeric fields of a trial, overlaid with its derived fields.
fn numeric_row(trial: &Map<String, Value>, rules: &[DerivedField]) -> BTreeMap<String, f64> {
    let mut row: BTreeMap<String, f64> = trial
        .iter()
        .filter_map(|(k, v)| number(v).map(|n| (k.clone(), n)))
        .collect();

    for rule in rules {
        match evaluate(&rule.rule, trial, &row) {
            Some(value) => {
                row.insert(rule.name.clone(), value);
            }
            // Input present but unusable: drop any direct value of the same name.
            None if is_derived_source(&rule.rule, trial) => {
                row.remove(&rule.name);
            }
            None => {}
        }
    }
    row
}

fn evaluate(
    rule: &Derivation,
    trial: &Map<String, Value>,
    row: &BTreeMap<String, f64>,
) -> Option<f64> {
    match rule {
        Derivation::Sum { list, field } => {
            trial.get(list)?.as_array()?.iter().try_fold(0.0, |acc, item| {
                Some(acc + number(item.as_object()?.get(field)?)?)
            })
        }
        Derivation::Count { list } => trial
            .get(list)?
            .as_array()
            .map(|items| items.len() as f64),
        Derivation::Ratio {
            numerator,
            denominator,
        } => {
            let den = *row.get(denominator)?;
            if den == 0.0 {
                return None;
            }
            Some(*row.get(numerator)? / den)
        }
    }
}

/// Whether the trial carries the input a rule reads.
fn is_derived_source(rule: &Derivation, trial: &Map<String, Value>) -> bool {
    match rule {
        Derivation::Sum { list, .. } | Derivation::Count { list } => trial.contains_key(list),
        Derivation::Ratio { .. } => true,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
