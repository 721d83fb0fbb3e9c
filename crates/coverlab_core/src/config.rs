//! Harness configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Bounds, RegionShape};
use crate::model::SweepSchema;
use crate::report::DerivedField;

/// Everything a sweep needs besides the parameter space.
///
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub root: PathBuf,
    /// Engine executable
    pub engine: PathBuf,
    /// Generated geometry artifacts
    pub regions_dir: PathBuf,
    /// Scene archives, one `<archive_size>.csv` each
    pub archives_dir: PathBuf,
    /// Engine reports, one `<tag>.json` each
    pub results_dir: PathBuf,
    /// Persisted sweep outcomes
    pub summaries_dir: PathBuf,
    /// Exported plot series
    pub figures_dir: PathBuf,
    /// Harness log file
    pub logs_dir: PathBuf,
    pub log_rotation: LogRotation,
    /// Per-run wall clock limit; `None` waits forever
    pub timeout_secs: Option<u64>,
    /// Concurrent engine processes
    pub workers: usize,
    /// Base seed for geometry generation
    pub seed: u64,
    pub bounds: Bounds,
    pub shape: RegionShape,
    pub derivations: Vec<DerivedField>,
    /// Skip the engine when a report for the tag already exists
    pub reuse_reports: bool,
    pub schema: SweepSchema,
    /// Write each sweep outcome to `summaries_dir`
    pub persist: bool,
    /// Write plot series to `figures_dir`
    pub export_series: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            engine: PathBuf::from("bin/expt"),
            regions_dir: PathBuf::from("data/experiment/generated_regions"),
            archives_dir: PathBuf::from("data/scenes/archives"),
            results_dir: PathBuf::from("data/experiment/results"),
            summaries_dir: PathBuf::from("data/experiment/summaries"),
            figures_dir: PathBuf::from("fig/experiment"),
            logs_dir: PathBuf::from("logs"),
            log_rotation: LogRotation::default(),
            timeout_secs: None,
            workers: 1,
            seed: 0,
            bounds: Bounds::default(),
            shape: RegionShape::default(),
            derivations: DerivedField::defaults(),
            reuse_reports: false,
            schema: SweepSchema::default(),
            persist: true,
            export_series: true,
        }
    }
}

/// Size limits for the harness log file.
///
/// Once the file grows past `max_bytes` it is cut down to roughly its last
/// `keep_bytes`, starting at a line boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRotation {
    pub max_bytes: u64,
    pub keep_bytes: u64,
}

impl Default for LogRotation {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            keep_bytes: 1024 * 1024,
        }
    }
}

impl HarnessConfig {
    /// A default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.log_rotation.keep_bytes > self.log_rotation.max_bytes {
            return Err(ConfigError::Invalid(format!(
                "log_rotation.keep_bytes ({}) exceeds max_bytes ({})",
                self.log_rotation.keep_bytes, self.log_rotation.max_bytes
            )));
        }
        if !self.bounds.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "bounds x={:?} y={:?} enclose no area",
                self.bounds.x, self.bounds.y
            )));
        }
        if let Some(dup) = self
            .derivations
            .iter()
            .enumerate()
            .find(|(i, d)| self.derivations[..*i].iter().any(|o| o.name == d.name))
        {
            return Err(ConfigError::Invalid(format!(
                "derived field `{}` is defined twice",
                dup.1.name
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    #[must_use]
    pub fn engine_path(&self) -> PathBuf {
        self.resolve(&self.engine)
    }

    #[must_use]
    pub fn regions_path(&self) -> PathBuf {
        self.resolve(&self.regions_dir)
    }

    #[must_use]
    pub fn archives_path(&self) -> PathBuf {
        self.resolve(&self.archives_dir)
    }

    /// Reports of one schema live in their own subdirectory.
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.resolve(&self.results_dir).join(self.schema.name())
    }

    #[must_use]
    pub fn summaries_path(&self) -> PathBuf {
        self.resolve(&self.summaries_dir)
    }

    #[must_use]
    pub fn figures_path(&self) -> PathBuf {
        self.resolve(&self.figures_dir)
    }

    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.resolve(&self.logs_dir).join("coverlab.log")
    }
}
