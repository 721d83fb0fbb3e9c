//! Plot series extracted from sweep rows.
//!
//! A series is the slice of a sweep along one parameter with every other
//! parameter held fixed. Rendering is left to whatever implements
//! [`PlotSink`]; [`SeriesExporter`] writes the series as JSON files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::StoreError;
use crate::io::atomic_write;
use crate::model::{ParamValue, RunConfig};
use crate::orchestrator::SummaryRow;

/// Summary fields plotted together on one timing chart.
const TIMING_FIELDS: [&str; 2] = ["t1", "t2"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// The parameter on the x axis
    pub parameter: String,
    /// Values of the other parameters
    pub fixed: RunConfig,
    pub x: Vec<ParamValue>,
    /// Field name to y values, aligned with `x`
    pub fields: BTreeMap<String, Vec<Option<f64>>>,
}

/// One series per parameter that takes more than one value in its largest
/// fixed group.
///
/// Rows are grouped by the values of every other parameter and the largest
/// group wins; ties go to the group seen first.
#[must_use]
pub fn extract_series(rows: &[SummaryRow], parameters: &[String]) -> Vec<Series> {
    parameters
        .iter()
        .filter_map(|parameter| series_for(rows, parameters, parameter))
        .collect()
}

fn series_for(rows: &[SummaryRow], parameters: &[String], parameter: &str) -> Option<Series> {
    let others: Vec<&str> = parameters
        .iter()
        .map(String::as_str)
        .filter(|p| *p != parameter)
        .collect();

    let mut groups: Vec<(Vec<Option<&ParamValue>>, Vec<&SummaryRow>)> = Vec::new();
    for row in rows {
        let key: Vec<Option<&ParamValue>> = others.iter().map(|p| row.value(p)).collect();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(row),
            None => groups.push((key, vec![row])),
        }
    }

    let mut best: Option<&(Vec<Option<&ParamValue>>, Vec<&SummaryRow>)> = None;
    for group in &groups {
        if best.is_none_or(|b| group.1.len() > b.1.len()) {
            best = Some(group);
        }
    }
    let (_, members) = best?;
    if members.len() < 2 {
        return None;
    }

    let mut members: Vec<&SummaryRow> = members.clone();
    members.sort_by(|a, b| match (a.value(parameter), b.value(parameter)) {
        (Some(a), Some(b)) => a.total_cmp(b),
        _ => std::cmp::Ordering::Equal,
    });

    let fixed = RunConfig::new(
        others
            .iter()
            .filter_map(|p| members[0].value(p).map(|v| (*p, v.clone()))),
    )
    .ok()?;
    let x = members
        .iter()
        .map(|row| row.value(parameter).cloned())
        .collect::<Option<Vec<_>>>()?;

    let mut fields: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for name in members.iter().flat_map(|row| row.summary.keys()) {
        fields.entry(name.clone()).or_insert_with(|| {
            members
                .iter()
                .map(|row| row.summary.get(name).copied())
                .collect()
        });
    }

    Some(Series {
        parameter: parameter.to_string(),
        fixed,
        x,
        fields,
    })
}

/// Destination for extracted series.
pub trait PlotSink {
    type Error;

    fn plot(&mut self, series: &Series) -> Result<(), Self::Error>;
}

/// Writes `<field>-<parameter>.json` per field and `t-<parameter>.json` for
/// the timing pair.
#[derive(Debug, Clone)]
pub struct SeriesExporter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SeriesExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write(&mut self, name: String, value: &serde_json::Value) -> Result<(), StoreError> {
        let path = self.dir.join(name);
        let bytes = serde_json::to_vec_pretty(value)?;
        atomic_write(&path, &bytes).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        self.written.push(path);
        Ok(())
    }
}

impl PlotSink for SeriesExporter {
    type Error = StoreError;

    fn plot(&mut self, series: &Series) -> Result<(), StoreError> {
        let parameter = &series.parameter;
        for (field, y) in &series.fields {
            let doc = json!({
                "parameter": parameter,
                "field": field,
                "fixed": series.fixed,
                "x": series.x,
                "y": y,
            });
            self.write(format!("{field}-{parameter}.json"), &doc)?;
        }

        if let [Some(t1), Some(t2)] = TIMING_FIELDS.map(|f| series.fields.get(f)) {
            let doc = json!({
                "parameter": parameter,
                "fixed": series.fixed,
                "x": series.x,
                "t1": t1,
                "t2": t2,
            });
            self.write(format!("t-{parameter}.json"), &doc)?;
        }
        Ok(())
    }
}
