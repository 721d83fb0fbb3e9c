//! Sweep orchestration: expand, dispatch, aggregate, collect.
//!
//! ```ignore
//! let orchestrator = SweepOrchestrator::new(HarnessConfig::with_root("."))?;
//! let outcome = orchestrator.run_sweep(&space, SweepMode::Factorial)?;
//! for row in outcome.summaries() {
//!     println!("{:?}", row.merged());
//! }
//! ```

mod outcome;

pub use outcome::{RunFailure, RunRecord, SummaryRow, SweepOutcome};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use rustc_hash::FxHashSet;

use crate::config::HarnessConfig;
use crate::engine::{EngineStatus, RunDispatcher};
use crate::error::{ConfigError, ReportError};
use crate::model::{ParameterSpace, RunConfig};
use crate::report::{Summary, summarize};
use crate::results::{PlotSink, ResultStore, SeriesExporter, extract_series};
use crate::sweep::{Expansion, SweepDesign, SweepMode, SweepProgress, expand};
use crate::tag::{Tag, tag};

/// Runs sweeps against one harness configuration.
#[derive(Debug)]
pub struct SweepOrchestrator {
    dispatcher: RunDispatcher,
    progress: SweepProgress,
}

impl SweepOrchestrator {
    pub fn new(config: HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            dispatcher: RunDispatcher::new(config),
            progress: SweepProgress::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        self.dispatcher.config()
    }

    #[must_use]
    pub fn dispatcher(&self) -> &RunDispatcher {
        &self.dispatcher
    }

    /// Shared handle for watching or cancelling the current sweep.
    #[must_use]
    pub fn progress(&self) -> &SweepProgress {
        &self.progress
    }

    /// Expand `space` and run every configuration.
    ///
    /// Configuration problems are returned before any engine is launched.
    /// Failures of individual runs are recorded on their records.
    pub fn run_sweep(
        &self,
        space: &ParameterSpace,
        mode: SweepMode,
    ) -> Result<SweepOutcome, ConfigError> {
        let schema = self.config().schema;
        let space = space.canonicalize(schema)?;
        space.require_complete(schema)?;
        let expansion = expand(&space, mode)?;
        self.run_expansion("sweep", expansion)
    }

    /// Run every sweep of a design. One-at-a-time designs yield one outcome
    /// per varied parameter, named `<name>-<parameter>`.
    pub fn run_design(
        &self,
        name: &str,
        design: &SweepDesign,
    ) -> Result<Vec<SweepOutcome>, ConfigError> {
        let expansions = design.canonicalize(self.config().schema)?.expand()?;
        // Validate every sweep before launching any of them.
        for expansion in &expansions {
            self.tags(expansion)?;
        }
        let several = expansions.len() > 1;
        expansions
            .into_iter()
            .map(|expansion| {
                let name = match (&expansion.varying, several) {
                    (Some(varying), true) => format!("{name}-{varying}"),
                    _ => name.to_string(),
                };
                self.run_expansion(&name, expansion)
            })
            .collect()
    }

    /// Dispatch and aggregate every configuration of an expansion.
    pub fn run_expansion(
        &self,
        name: &str,
        expansion: Expansion,
    ) -> Result<SweepOutcome, ConfigError> {
        let tags = self.tags(&expansion)?;
        let config = self.config();
        tracing::info!(
            sweep = name,
            schema = config.schema.name(),
            runs = expansion.len(),
            workers = config.workers,
            "starting sweep"
        );
        self.progress.reset(expansion.len());

        let records = self.execute_all(&expansion.configs, &tags);

        let outcome = SweepOutcome {
            name: name.to_string(),
            schema: config.schema,
            parameters: expansion.parameters,
            varying: expansion.varying,
            records,
            finished: jiff::Timestamp::now(),
        };
        let failed = outcome.failures().count();
        tracing::info!(
            sweep = name,
            runs = outcome.records.len(),
            failed,
            "sweep finished"
        );

        if config.persist {
            match ResultStore::new(config.summaries_path()).save(&outcome) {
                Ok(path) => tracing::info!(path = %path.display(), "saved sweep outcome"),
                Err(e) => tracing::warn!(error = %e, "failed to save sweep outcome"),
            }
        }
        if config.export_series {
            let mut exporter = SeriesExporter::new(config.figures_path().join(name));
            for series in extract_series(&outcome.summaries(), &outcome.parameters) {
                if let Err(e) = exporter.plot(&series) {
                    tracing::warn!(parameter = %series.parameter, error = %e, "failed to export series");
                }
            }
        }
        Ok(outcome)
    }

    /// Tags of every configuration. Each run owns the files named by its
    /// tag, so a repeated tag is rejected.
    fn tags(&self, expansion: &Expansion) -> Result<Vec<Tag>, ConfigError> {
        let schema = self.config().schema;
        let tags = expansion
            .configs
            .iter()
            .map(|c| tag(c, schema))
            .collect::<Result<Vec<_>, _>>()?;
        let mut seen = FxHashSet::default();
        if let Some(repeated) = tags.iter().find(|t| !seen.insert(*t)) {
            return Err(ConfigError::DuplicateTag(repeated.to_string()));
        }
        Ok(tags)
    }

    fn execute_all(&self, configs: &[RunConfig], tags: &[Tag]) -> Vec<RunRecord> {
        #[cfg(feature = "parallel")]
        if self.config().workers > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config().workers)
                .build()
            {
                Ok(pool) => {
                    // Indexed collect keeps expansion order.
                    return pool.install(|| {
                        configs
                            .par_iter()
                            .zip(tags.par_iter())
                            .map(|(config, tag)| self.execute(config, tag))
                            .collect()
                    });
                }
                Err(e) => tracing::warn!(error = %e, "thread pool unavailable, running sequentially"),
            }
        }

        configs
            .iter()
            .zip(tags)
            .map(|(config, tag)| self.execute(config, tag))
            .collect()
    }

    fn execute(&self, config: &RunConfig, tag: &Tag) -> RunRecord {
        let (summary, exit_code, failure) = if self.progress.is_cancelled() {
            (Summary::new(), None, Some(RunFailure::Cancelled))
        } else {
            let result = self.dispatch_and_summarize(config);
            self.progress.increment();
            result
        };

        match &failure {
            Some(failure) => tracing::warn!(%tag, %failure, "run failed"),
            None => tracing::debug!(%tag, fields = summary.len(), "run complete"),
        }
        RunRecord {
            config: config.clone(),
            tag: tag.clone(),
            summary,
            exit_code,
            failure,
        }
    }

    fn dispatch_and_summarize(
        &self,
        config: &RunConfig,
    ) -> (Summary, Option<i32>, Option<RunFailure>) {
        let outcome = match self.dispatcher.dispatch(config) {
            Ok(outcome) => outcome,
            Err(e) => {
                let failure = RunFailure::Dispatch {
                    message: e.to_string(),
                };
                return (Summary::new(), None, Some(failure));
            }
        };

        let (exit_code, stderr) = match outcome.status {
            EngineStatus::Exited { code, stderr } => (code, stderr),
            EngineStatus::Reused => (None, String::new()),
            EngineStatus::SpawnFailed(message) => {
                return (Summary::new(), None, Some(RunFailure::SpawnFailed { message }));
            }
            // Whatever the engine left behind before the kill is ignored.
            EngineStatus::TimedOut { stderr } => {
                tracing::debug!(tag = %outcome.tag, stderr = %stderr, "engine killed at deadline");
                return (Summary::new(), None, Some(RunFailure::TimedOut));
            }
        };

        match summarize(&outcome.report_path, &self.config().derivations) {
            Ok(summary) => (summary, exit_code, None),
            Err(ReportError::Missing(_)) => (
                Summary::new(),
                exit_code,
                Some(RunFailure::MissingReport { exit_code, stderr }),
            ),
            Err(e) => (
                Summary::new(),
                exit_code,
                Some(RunFailure::MalformedReport {
                    exit_code,
                    stderr,
                    message: e.to_string(),
                }),
            ),
        }
    }
}
