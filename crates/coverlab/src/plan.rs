//! YAML experiment plans.
//!
//! ```yaml
//! harness:
//!   workers: 4
//!   timeout_secs: 600
//! schema: query
//! experiments:
//!   - name: delta
//!     design:
//!       kind: single
//!       space:
//!         delta: [0.05, 0.025, 0.0125]
//!         n_regions: [10]
//!         region_size: [0.25]
//!         archive_size: [1000]
//! ```

use std::path::{Path, PathBuf};

use color_eyre::eyre::{WrapErr, bail};
use serde::{Deserialize, Serialize};

use coverlab_core::sweep::SweepDesign;
use coverlab_core::{HarnessConfig, SweepSchema};

/// A harness configuration and the experiments to run with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    /// Overrides of the default harness configuration
    #[serde(default)]
    pub harness: HarnessConfig,

    /// Shorthand for `harness.schema`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SweepSchema>,

    pub experiments: Vec<Experiment>,
}

/// One named design. Its outcomes are persisted and exported under `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub name: String,
    pub design: SweepDesign,
}

impl ExperimentPlan {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Save to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    /// Read and check a plan file.
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read plan {}", path.display()))?;
        let plan = Self::from_yaml(&yaml)
            .wrap_err_with(|| format!("failed to parse plan {}", path.display()))?;
        plan.check()?;
        Ok(plan)
    }

    /// Experiment names become directory names, so they must be usable as
    /// such and unique.
    pub fn check(&self) -> color_eyre::Result<()> {
        if self.experiments.is_empty() {
            bail!("plan has no experiments");
        }
        for (i, experiment) in self.experiments.iter().enumerate() {
            let name = experiment.name.as_str();
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                bail!("invalid experiment name `{name}`");
            }
            if self.experiments[..i].iter().any(|e| e.name == name) {
                bail!("experiment `{name}` is defined twice");
            }
        }
        Ok(())
    }

    /// The harness configuration to run this plan with.
    ///
    /// `root` (from the command line) wins over `harness.root`; a relative
    /// `harness.root` is taken relative to `plan_dir`.
    #[must_use]
    pub fn harness_config(&self, root: Option<&Path>, plan_dir: &Path) -> HarnessConfig {
        let mut config = self.harness.clone();
        if let Some(schema) = self.schema {
            config.schema = schema;
        }
        config.root = match root {
            Some(root) => root.to_path_buf(),
            None if config.root.is_relative() => plan_dir.join(&config.root),
            None => config.root,
        };
        config
    }
}

/// Directory a plan file's relative paths are resolved against.
#[must_use]
pub fn plan_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
