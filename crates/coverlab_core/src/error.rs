use std::path::PathBuf;

use thiserror::Error;

/// Problems with a sweep definition or harness configuration.
///
/// These are always fatal and are raised before any engine process is launched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("parameter `{name}` is required by the {schema} schema but was not provided")]
    MissingParameter { name: String, schema: &'static str },
    #[error("parameter `{name}` is not recognized by the {schema} schema")]
    UnknownParameter { name: String, schema: &'static str },
    #[error("parameter `{0}` is declared more than once")]
    DuplicateParameter(String),
    #[error("parameter `{0}` has no candidate values")]
    EmptyCandidates(String),
    #[error("parameter `{name}` lists candidate {value} more than once")]
    DuplicateCandidate { name: String, value: String },
    #[error("two configurations of one sweep share the tag `{0}`")]
    DuplicateTag(String),
    #[error("varied parameter `{0}` has no default value")]
    NoDefault(String),
    #[error("single-variable sweep has more than one varying parameter: {}", .0.join(", "))]
    AmbiguousVariation(Vec<String>),
    #[error("invalid harness configuration: {0}")]
    Invalid(String),
}

/// Errors reading or writing geometry artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("polygon {row} is not a JSON list of [x, y] pairs: {source}")]
    Polygon {
        row: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("delta {value:?} in row {row} is not a number")]
    Delta { row: usize, value: String },
    #[error("geometry file {0} has no `Polygon` column")]
    MissingPolygonColumn(PathBuf),
}

/// Errors that abort a single run. The sweep itself carries on.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("geometry artifact: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("archive {0} does not exist")]
    MissingArchive(PathBuf),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading an engine report from disk.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report {0} was not produced")]
    Missing(PathBuf),
    #[error("report {path} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors persisting or loading sweep results.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Precondition violations of the cell codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
    #[error("cell index ({xi}, {yi}) does not fit in 32 unsigned bits")]
    IndexOutOfRange { xi: i64, yi: i64 },
    #[error("cell size must be positive and finite, got {0}")]
    InvalidDelta(f64),
}

pub(crate) fn io_error(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> RunError {
    let path = path.into();
    move |source| RunError::Io { path, source }
}
