use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;

use super::GeometryArtifact;
use crate::error::ArtifactError;
use crate::io::atomic_write;

/// At-most-once store of geometry artifacts, keyed by geometry key.
///
/// An existing file is reused as-is and never revalidated. Creation of a
/// missing key is serialized per key within the process and published by an
/// atomic rename, so no reader ever sees a partial file.
#[derive(Debug)]
pub struct ArtifactCache {
    dir: PathBuf,
    locks: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
    generated: AtomicUsize,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(FxHashMap::default()),
            generated: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.csv"))
    }

    /// Number of artifacts this cache has written.
    #[must_use]
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    /// Path of the artifact for `key`, calling `generate` only if it does not exist yet.
    pub fn get_or_create<F>(&self, key: &str, generate: F) -> Result<PathBuf, ArtifactError>
    where
        F: FnOnce() -> GeometryArtifact,
    {
        let path = self.path_for(key);
        if path.is_file() {
            return Ok(path);
        }

        let lock = self.key_lock(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another thread may have finished while we waited.
        if path.is_file() {
            return Ok(path);
        }

        let artifact = generate();
        let bytes = artifact.to_csv_bytes()?;
        atomic_write(&path, &bytes).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        self.generated.fetch_add(1, Ordering::Relaxed);
        tracing::info!(key, regions = artifact.len(), path = %path.display(), "generated geometry");
        Ok(path)
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }
}
