use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::io::atomic_write;
use crate::orchestrator::SweepOutcome;

const PREFIX: &str = "summary-";

/// Timestamped sweep outcomes on disk.
///
/// Each save writes `summary-<stamp>.json` with the full records and a
/// matching `.csv` with one row per successful run.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist an outcome and return the path of its JSON file.
    pub fn save(&self, outcome: &SweepOutcome) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let json = serde_json::to_vec_pretty(outcome)?;
        let (json_path, mut file) = self.claim(outcome)?;
        file.write_all(&json)
            .and_then(|()| file.sync_all())
            .map_err(|source| StoreError::Io {
                path: json_path.clone(),
                source,
            })?;

        let csv_path = json_path.with_extension("csv");
        let csv = outcome_csv(outcome)?;
        atomic_write(&csv_path, &csv).map_err(|source| StoreError::Io {
            path: csv_path,
            source,
        })?;
        Ok(json_path)
    }

    /// The `n` most recent outcomes, newest first.
    pub fn load_latest(&self, n: usize) -> Result<Vec<SweepOutcome>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "json")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(PREFIX))
            })
            .collect();
        // Stamps are fixed-width, so name order is time order.
        paths.sort();
        paths.reverse();

        paths
            .into_iter()
            .take(n)
            .map(|path| -> Result<SweepOutcome, StoreError> {
                let bytes = fs::read(&path).map_err(|source| StoreError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(serde_json::from_slice(&bytes)?)
            })
            .collect()
    }

    /// Create the JSON file for a new outcome without clobbering an existing one.
    fn claim(&self, outcome: &SweepOutcome) -> Result<(PathBuf, fs::File), StoreError> {
        let stamp = format!(
            "{}{:06}",
            outcome.finished.strftime("%Y%m%dT%H%M%S"),
            outcome.finished.subsec_microsecond()
        );
        let mut last = None;
        for attempt in 0..1000u32 {
            let name = if attempt == 0 {
                format!("{PREFIX}{stamp}.json")
            } else {
                format!("{PREFIX}{stamp}{attempt:03}.json")
            };
            let path = self.dir.join(name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => last = Some((path, e)),
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
        let (path, source) = last.unwrap_or_else(|| {
            (
                self.dir.clone(),
                std::io::Error::from(ErrorKind::AlreadyExists),
            )
        });
        Err(StoreError::Io { path, source })
    }
}

/// Parameters in declared order, then the sorted union of summary fields.
fn outcome_csv(outcome: &SweepOutcome) -> Result<Vec<u8>, StoreError> {
    let fields = outcome.fields();
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(outcome.parameters.iter().chain(&fields))?;
        for row in outcome.summaries() {
            let values = outcome
                .parameters
                .iter()
                .map(|p| row.value(p).map(ToString::to_string).unwrap_or_default());
            let means = fields
                .iter()
                .map(|f| row.summary.get(f).map(|v| v.to_string()).unwrap_or_default());
            writer.write_record(values.chain(means))?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(buf)
}
