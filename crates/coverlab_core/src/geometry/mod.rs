//! Input geometry for engine runs.
//!
//! Regions are plain vertex lists in lon/lat order. They are generated once
//! per geometry key, written to CSV and reused by every run sharing the key.

mod artifact;
mod cache;
mod synth;

pub use artifact::{GeometryArtifact, RegionRow};
pub use cache::ArtifactCache;
pub use synth::{Bounds, RegionGenerator, RegionShape, artifact_seed};

pub type Point = [f64; 2];
pub type Polygon = Vec<Point>;

/// Unsigned shoelace area.
#[must_use]
pub fn polygon_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let [x0, y0] = polygon[i];
            let [x1, y1] = polygon[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum();
    twice.abs() / 2.0
}
