//! Bit-packed grid cell identifiers.
//!
//! The engine reports discretized coverage as lists of 64-bit cell ids. The
//! x index lives in the low 32 bits and the y index in the high 32 bits; the
//! cell size (`delta`) travels separately in the report.

use serde::{Deserialize, Serialize};

use crate::error::CellError;

const LOW_MASK: u64 = 0xFFFF_FFFF;

/// Corners of a grid cell, counter-clockwise from the lower-left.
pub type CellPolygon = [[f64; 2]; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u64);

impl CellId {
    #[must_use]
    pub fn encode(xi: u32, yi: u32) -> Self {
        CellId(u64::from(xi) | (u64::from(yi) << 32))
    }

    /// Checked encoding for indices computed from real coordinates.
    pub fn try_from_indices(xi: i64, yi: i64) -> Result<Self, CellError> {
        match (u32::try_from(xi), u32::try_from(yi)) {
            (Ok(x), Ok(y)) => Ok(Self::encode(x, y)),
            _ => Err(CellError::IndexOutOfRange { xi, yi }),
        }
    }

    #[must_use]
    pub fn decode(self) -> (u32, u32) {
        ((self.0 & LOW_MASK) as u32, (self.0 >> 32) as u32)
    }

    /// The square this cell covers at resolution `delta`.
    #[must_use]
    pub fn polygon(self, delta: f64) -> CellPolygon {
        let (xi, yi) = self.decode();
        let x = f64::from(xi) * delta;
        let y = f64::from(yi) * delta;
        let (x1, y1) = ((f64::from(xi) + 1.0) * delta, (f64::from(yi) + 1.0) * delta);
        [[x, y], [x1, y], [x1, y1], [x, y1]]
    }
}

/// Decode a raw id into its cell polygon.
#[must_use]
pub fn decode_cell(id: u64, delta: f64) -> CellPolygon {
    CellId(id).polygon(delta)
}

/// Decode every id of a report's `cells` list.
#[must_use]
pub fn decode_cells(ids: &[u64], delta: f64) -> Vec<CellPolygon> {
    ids.iter().map(|&id| decode_cell(id, delta)).collect()
}

/// Cell containing the point `(x, y)` at resolution `delta`.
pub fn cell_index(x: f64, y: f64, delta: f64) -> Result<CellId, CellError> {
    if !(delta.is_finite() && delta > 0.0) {
        return Err(CellError::InvalidDelta(delta));
    }
    let (fx, fy) = ((x / delta).floor(), (y / delta).floor());
    // Saturating float-to-int casts keep out-of-range points out of range.
    CellId::try_from_indices(fx as i64, fy as i64)
}
