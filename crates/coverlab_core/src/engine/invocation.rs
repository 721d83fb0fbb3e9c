//! Command lines for the external engine.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use crate::error::ConfigError;
use crate::model::{RunConfig, SweepSchema, field};

/// Files one run reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    pub geometry: PathBuf,
    pub archive: PathBuf,
    pub report: PathBuf,
}

/// A program and its argument vector. Never passed through a shell.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Build the engine invocation for one run.
    ///
    /// `query`: `-a <geometry> -s <archive> -d <delta> -o <report>`
    ///
    /// `coverage`: `-s <settings json> -r <regions dir> -a <archives dir> -o <report>`,
    /// where the settings carry every configuration value plus the geometry
    /// and archive file names.
    pub fn new(
        schema: SweepSchema,
        program: &Path,
        config: &RunConfig,
        paths: &RunPaths,
    ) -> Result<Self, ConfigError> {
        let args = match schema {
            SweepSchema::Query => {
                let delta = config
                    .get(field::DELTA)
                    .ok_or_else(|| ConfigError::MissingParameter {
                        name: field::DELTA.to_string(),
                        schema: schema.name(),
                    })?;
                vec![
                    "-a".into(),
                    paths.geometry.clone().into_os_string(),
                    "-s".into(),
                    paths.archive.clone().into_os_string(),
                    "-d".into(),
                    delta.to_string().into(),
                    "-o".into(),
                    paths.report.clone().into_os_string(),
                ]
            }
            SweepSchema::Coverage => {
                let settings = coverage_settings(config, paths);
                vec![
                    "-s".into(),
                    settings.to_string().into(),
                    "-r".into(),
                    parent_of(&paths.geometry),
                    "-a".into(),
                    parent_of(&paths.archive),
                    "-o".into(),
                    paths.report.clone().into_os_string(),
                ]
            }
        };
        Ok(Self {
            program: program.to_path_buf(),
            args,
        })
    }

    #[must_use]
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Human-readable rendering for logs.
    #[must_use]
    pub fn display(&self) -> String {
        let mut out = self.program.display().to_string();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }
}

fn coverage_settings(config: &RunConfig, paths: &RunPaths) -> Value {
    let mut settings = config.to_json_map();
    settings.insert("regions".into(), file_name(&paths.geometry).into());
    settings.insert("archive".into(), file_name(&paths.archive).into());
    Value::Object(settings)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_of(path: &Path) -> OsString {
    path.parent()
        .map(|p| p.as_os_str().to_os_string())
        .unwrap_or_else(|| OsString::from("."))
}
