use std::fs;
use std::io;
use std::path::PathBuf;

use super::invocation::{Invocation, RunPaths};
use super::process::{ProcessExit, run_to_completion};
use crate::config::HarnessConfig;
use crate::error::{ConfigError, RunError, io_error};
use crate::geometry::{ArtifactCache, GeometryArtifact, RegionGenerator, artifact_seed};
use crate::model::{ParamValue, RegionSizing, RunConfig, field};
use crate::tag::{Tag, component, geometry_key, tag};

/// What the engine did for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Exited { code: Option<i32>, stderr: String },
    TimedOut { stderr: String },
    SpawnFailed(String),
    /// A report for this tag already existed and `reuse_reports` was set
    Reused,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub tag: Tag,
    pub report_path: PathBuf,
    pub status: EngineStatus,
}

/// Prepares inputs for one run and launches the engine on them.
///
/// Safe to share between threads: geometry creation is serialized per key by
/// the artifact cache and every run owns the report path derived from its tag.
#[derive(Debug)]
pub struct RunDispatcher {
    config: HarnessConfig,
    cache: ArtifactCache,
}

impl RunDispatcher {
    pub fn new(config: HarnessConfig) -> Self {
        let cache = ArtifactCache::new(config.regions_path());
        Self { config, cache }
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Ensure inputs exist, run the engine and report where its output went.
    ///
    /// The engine's exit code is recorded but not trusted: whether the report
    /// file exists is what the caller checks.
    pub fn dispatch(&self, run: &RunConfig) -> Result<RunOutcome, RunError> {
        let schema = self.config.schema;
        let tag = tag(run, schema)?;

        let geometry = self.ensure_geometry(run)?;

        let archive_value = required(run, field::ARCHIVE_SIZE, schema.name())?;
        let archive = self
            .config
            .archives_path()
            .join(format!("{}.csv", component(archive_value)));
        if !archive.is_file() {
            return Err(RunError::MissingArchive(archive));
        }

        let results_dir = self.config.results_path();
        fs::create_dir_all(&results_dir).map_err(io_error(&results_dir))?;
        let report_path = results_dir.join(format!("{tag}.json"));

        if report_path.is_file() {
            if self.config.reuse_reports {
                tracing::debug!(%tag, "reusing existing report");
                return Ok(RunOutcome {
                    tag,
                    report_path,
                    status: EngineStatus::Reused,
                });
            }
            match fs::remove_file(&report_path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(&report_path)(e)),
            }
        }

        let paths = RunPaths {
            geometry,
            archive,
            report: report_path.clone(),
        };
        let invocation = Invocation::new(schema, &self.config.engine_path(), run, &paths)?;
        tracing::debug!(%tag, command = %invocation.display(), "launching engine");

        let status = match run_to_completion(invocation.command(), self.config.timeout()) {
            ProcessExit::Exited { code, stderr } => EngineStatus::Exited { code, stderr },
            ProcessExit::TimedOut { stderr } => EngineStatus::TimedOut { stderr },
            ProcessExit::SpawnFailed(message) => EngineStatus::SpawnFailed(message),
        };
        Ok(RunOutcome {
            tag,
            report_path,
            status,
        })
    }

    fn ensure_geometry(&self, run: &RunConfig) -> Result<PathBuf, RunError> {
        let schema = self.config.schema;
        let key = geometry_key(run, schema)?;

        let n = region_count(required(run, field::N_REGIONS, schema.name())?)?;
        let sizing = schema.sizing();
        let size_field = match sizing {
            RegionSizing::Absolute => field::REGION_SIZE,
            RegionSizing::BoundsRatio => field::RATIO,
        };
        let size = required(run, size_field, schema.name())?
            .as_f64()
            .ok_or_else(|| ConfigError::Invalid(format!("`{size_field}` must be numeric")))?;

        let seed = artifact_seed(self.config.seed, &key);
        let path = self.cache.get_or_create(&key, || {
            let mut generator = RegionGenerator::new(self.config.bounds, self.config.shape, seed);
            let polygons = match sizing {
                RegionSizing::Absolute => generator.with_area(n, size),
                RegionSizing::BoundsRatio => generator.by_ratio(n, size),
            };
            GeometryArtifact::from_polygons(polygons, None)
        })?;
        Ok(path)
    }
}

fn required<'a>(
    run: &'a RunConfig,
    name: &str,
    schema: &'static str,
) -> Result<&'a ParamValue, ConfigError> {
    run.get(name).ok_or_else(|| ConfigError::MissingParameter {
        name: name.to_string(),
        schema,
    })
}

fn region_count(value: &ParamValue) -> Result<usize, ConfigError> {
    let count = match value {
        ParamValue::Int(n) => usize::try_from(*n).ok(),
        ParamValue::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as usize),
        _ => None,
    };
    count.ok_or_else(|| {
        ConfigError::Invalid(format!(
            "`{}` must be a non-negative integer, got {value}",
            field::N_REGIONS
        ))
    })
}
