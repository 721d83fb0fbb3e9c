//! Experiment sweep and result aggregation harness
//!
//! This crate drives an external coverage-query engine across a grid of
//! experiment parameters and reduces its reports to comparable numbers.
//! It provides:
//! - Parameter space expansion (full factorial, single variable, one at a time)
//! - Deterministic run tags that double as cache keys and file names
//! - Seeded synthesis of region-of-interest geometry, generated once per key
//! - Subprocess dispatch of the engine with timeouts and stderr capture
//! - Normalization and aggregation of flat and sectioned JSON reports
//! - A codec for the engine's bit-packed grid cell identifiers
//!
//! # Running a sweep
//!
//! ```ignore
//! use coverlab_core::{HarnessConfig, ParameterSpace, SweepMode, SweepOrchestrator};
//!
//! let space = ParameterSpace::new([
//!     ("delta", vec![0.05.into()]),
//!     ("n_regions", vec![10.into(), 20.into(), 40.into()]),
//!     ("region_size", vec![0.25.into()]),
//!     ("archive_size", vec![1000.into()]),
//! ])?;
//!
//! let orchestrator = SweepOrchestrator::new(HarnessConfig::with_root("."))?;
//! let outcome = orchestrator.run_sweep(&space, SweepMode::SingleVariable)?;
//! for row in outcome.summaries() {
//!     println!("{:?}", row.merged());
//! }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod cell;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod io;
pub mod orchestrator;
pub mod report;
pub mod results;
pub mod sweep;
pub mod tag;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use cell::{CellId, decode_cell, decode_cells};
pub use config::{HarnessConfig, LogRotation};
pub use error::{ArtifactError, CellError, ConfigError, ReportError, RunError, StoreError};
pub use model::{ParamValue, ParameterSpace, RunConfig, SweepSchema};
pub use orchestrator::{RunFailure, RunRecord, SweepOrchestrator, SweepOutcome};
pub use report::{Summary, aggregate};
pub use sweep::{SweepDesign, SweepMode, SweepProgress, expand};
pub use tag::{Tag, tag};
