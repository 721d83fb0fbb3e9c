//! Geometry CSV files.
//!
//! One row per region. The `Polygon` column holds a JSON array of `[x, y]`
//! pairs; the optional `Delta` column carries a per-region cell size.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Polygon;
use crate::error::ArtifactError;

const POLYGON_COLUMN: &str = "Polygon";
const DELTA_COLUMN: &str = "Delta";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRow {
    pub polygon: Polygon,
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryArtifact {
    pub rows: Vec<RegionRow>,
}

impl GeometryArtifact {
    #[must_use]
    pub fn from_polygons(polygons: Vec<Polygon>, delta: Option<f64>) -> Self {
        Self {
            rows: polygons
                .into_iter()
                .map(|polygon| RegionRow { polygon, delta })
                .collect(),
        }
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.rows.iter().map(|row| &row.polygon)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read an artifact. Column names are matched case-insensitively.
    pub fn read(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers()?.clone();
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let polygon_col =
            find(POLYGON_COLUMN).ok_or_else(|| ArtifactError::MissingPolygonColumn(path.into()))?;
        let delta_col = find(DELTA_COLUMN);

        let mut rows = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let raw = record.get(polygon_col).unwrap_or_default();
            let polygon: Polygon = serde_json::from_str(raw)
                .map_err(|source| ArtifactError::Polygon { row, source })?;

            let delta = match delta_col.and_then(|i| record.get(i)).map(str::trim) {
                None | Some("") => None,
                Some(value) => Some(value.parse::<f64>().map_err(|_| ArtifactError::Delta {
                    row,
                    value: value.to_string(),
                })?),
            };
            rows.push(RegionRow { polygon, delta });
        }
        Ok(Self { rows })
    }

    /// Serialize to CSV. The `Delta` column is written only if some row has one.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let with_delta = self.rows.iter().any(|row| row.delta.is_some());
        let mut buf = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            if with_delta {
                writer.write_record([POLYGON_COLUMN, DELTA_COLUMN])?;
            } else {
                writer.write_record([POLYGON_COLUMN])?;
            }
            for (row, region) in self.rows.iter().enumerate() {
                let polygon = serde_json::to_string(&region.polygon)
                    .map_err(|source| ArtifactError::Polygon { row, source })?;
                if with_delta {
                    let delta = region.delta.map(|d| format!("{d:?}")).unwrap_or_default();
                    writer.write_record([polygon, delta])?;
                } else {
                    writer.write_record([polygon])?;
                }
            }
            writer.flush().map_err(csv::Error::from)?;
        }
        Ok(buf)
    }
}
