//! Command-line front end for coverlab sweeps
//!
//! The binary reads a YAML experiment plan, builds a
//! [`coverlab_core::HarnessConfig`] from it and runs every experiment through
//! a [`coverlab_core::SweepOrchestrator`]. Logging goes to stderr and to
//! the harness log file, trimmed per `harness.log_rotation`.

pub mod cli;
pub mod logging;
pub mod plan;

pub use logging::init_logging;
pub use plan::{Experiment, ExperimentPlan};
