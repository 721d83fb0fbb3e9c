//! Harness log file with size-based trimming, mirrored to stderr.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use coverlab_core::{HarnessConfig, LogRotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Cut `path` down to its most recent `rotation.keep_bytes` once it exceeds
/// `rotation.max_bytes`. Returns whether the file was trimmed.
fn trim_log(path: &Path, rotation: LogRotation) -> io::Result<bool> {
    let len = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if len <= rotation.max_bytes {
        return Ok(false);
    }

    let mut tail = Vec::new();
    {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(len.saturating_sub(rotation.keep_bytes)))?;
        file.read_to_end(&mut tail)?;
    }

    // Drop the partial first line
    let start = tail
        .iter()
        .position(|&b| b == b'\n')
        .map_or(tail.len(), |i| i + 1);

    let mut file = File::create(path)?;
    writeln!(file, "--- coverlab log trimmed from {len} bytes ---")?;
    file.write_all(&tail[start..])?;
    Ok(true)
}

/// Initialize logging to the harness log file and stderr.
///
/// The file gets every event that passes the filter, with targets and no
/// colours. Stderr gets a compact copy so a long sweep shows progress.
/// The level can be overridden with `RUST_LOG`.
pub fn init_logging(config: &HarnessConfig, level: &str) -> color_eyre::Result<PathBuf> {
    let log_path = config.log_path();
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir)?;
    }

    if let Err(e) = trim_log(&log_path, config.log_rotation) {
        eprintln!("Warning: failed to trim {}: {e}", log_path.display());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("coverlab={level},coverlab_core={level}")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .with(
            fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .try_init()?;

    tracing::info!(
        log_path = %log_path.display(),
        schema = config.schema.name(),
        "coverlab logging initialized"
    );
    Ok(log_path)
}
