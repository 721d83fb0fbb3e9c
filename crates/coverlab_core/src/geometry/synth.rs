//! Synthetic region-of-interest generation.

use std::f64::consts::PI;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use super::{Point, Polygon};

/// Rectangle inside which regions are placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            x: [120.0, 128.0],
            y: [42.0, 50.0],
        }
    }
}

impl Bounds {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x[1] - self.x[0]
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y[1] - self.y[0]
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

/// Shape family of generated regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionShape {
    /// Randomly rotated, stretched regular polygons with 3 to 9 vertices
    #[default]
    Polygon,
    /// Axis-aligned rectangles with normally distributed aspect
    Rectangle,
}

/// Seeded generator for region polygons.
pub struct RegionGenerator {
    bounds: Bounds,
    shape: RegionShape,
    rng: StdRng,
}

impl RegionGenerator {
    #[must_use]
    pub fn new(bounds: Bounds, shape: RegionShape, seed: u64) -> Self {
        Self {
            bounds,
            shape,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `n` regions of absolute area `size`, in the configured shape.
    pub fn with_area(&mut self, n: usize, size: f64) -> Vec<Polygon> {
        match self.shape {
            RegionShape::Polygon => self.regular_polygons(n, size),
            RegionShape::Rectangle => (0..n).map(|_| self.rectangle(size)).collect(),
        }
    }

    /// `n` regions each covering `ratio` of the bounds' area, in the configured shape.
    pub fn by_ratio(&mut self, n: usize, ratio: f64) -> Vec<Polygon> {
        let size = self.bounds.area() * ratio;
        self.with_area(n, size)
    }

    pub fn regular_polygons(&mut self, n: usize, size: f64) -> Vec<Polygon> {
        (0..n).map(|_| self.polygon(size)).collect()
    }

    pub fn axis_aligned_rectangles(&mut self, n: usize, ratio: f64) -> Vec<Polygon> {
        let size = self.bounds.area() * ratio;
        (0..n).map(|_| self.rectangle(size)).collect()
    }

    fn polygon(&mut self, size: f64) -> Polygon {
        let n_vertices = self.rng.random_range(3..10);
        let side = size.max(0.0).sqrt();

        let mut vertices = unit_polygon(n_vertices);
        scale(&mut vertices, side, side);
        for _ in 0..3 {
            scale(&mut vertices, 0.8, 1.25);
            let theta = self.rng.random::<f64>() * 2.0 * PI;
            rotate(&mut vertices, theta);
        }

        let cx = self.uniform(self.bounds.x[0] + side, self.bounds.x[1] - side);
        let cy = self.uniform(self.bounds.y[0] + side, self.bounds.y[1] - side);
        translate(&mut vertices, cx, cy);
        vertices
    }

    fn rectangle(&mut self, size: f64) -> Polygon {
        let [x0, x1] = self.bounds.x;
        let [y0, y1] = self.bounds.y;
        let mean_width = size.max(0.0).sqrt();
        let min_width = (size / self.bounds.height()).min(self.bounds.width());

        let drawn = Normal::new(mean_width, mean_width / 4.0)
            .map(|normal| normal.sample(&mut self.rng))
            .unwrap_or(mean_width);
        let width = drawn.clamp(min_width, self.bounds.width());
        let height = if width > 0.0 { size / width } else { 0.0 };

        let dx = self.uniform(0.0, x1 - (x0 + width));
        let dy = self.uniform(0.0, y1 - (y0 + height));
        let (minx, miny) = (x0 + dx, y0 + dy);
        vec![
            [minx, miny],
            [minx + width, miny],
            [minx + width, miny + height],
            [minx, miny + height],
        ]
    }

    /// Uniform draw in `[lo, hi)`; collapses to the midpoint when the range is empty.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            (lo + hi) / 2.0
        }
    }
}

/// Seed for the artifact identified by `key`, stable across processes.
#[must_use]
pub fn artifact_seed(base_seed: u64, key: &str) -> u64 {
    let mut hasher = FxHasher::default();
    base_seed.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Regular polygon with `n` vertices scaled to unit area.
fn unit_polygon(n: usize) -> Polygon {
    let step = 2.0 * PI / n as f64;
    let area = 0.5 * (step).sin() * n as f64;
    let r = 1.0 / area.sqrt();
    (0..n)
        .map(|k| {
            let theta = step * k as f64;
            [r * theta.cos(), r * theta.sin()]
        })
        .collect()
}

fn scale(vertices: &mut [Point], sx: f64, sy: f64) {
    for v in vertices {
        v[0] *= sx;
        v[1] *= sy;
    }
}

fn rotate(vertices: &mut [Point], theta: f64) {
    let (sin, cos) = theta.sin_cos();
    for v in vertices {
        let [x, y] = *v;
        *v = [cos * x - sin * y, sin * x + cos * y];
    }
}

fn translate(vertices: &mut [Point], dx: f64, dy: f64) {
    for v in vertices {
        v[0] += dx;
        v[1] += dy;
    }
}
