//! Blocking subprocess execution with an optional deadline.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Captured stderr is cut to its last this-many bytes.
const STDERR_LIMIT: usize = 8 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How a child process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessExit {
    /// The process exited on its own. `code` is `None` when killed by a signal.
    Exited { code: Option<i32>, stderr: String },
    /// The deadline passed and the process was killed.
    TimedOut { stderr: String },
    /// The process could not be started.
    SpawnFailed(String),
}

/// Run `cmd` to completion, discarding stdout and capturing stderr.
pub fn run_to_completion(mut cmd: Command, timeout: Option<Duration>) -> ProcessExit {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return ProcessExit::SpawnFailed(e.to_string()),
    };

    // Drain stderr concurrently so a chatty child never blocks on a full pipe.
    let reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });
    let collect = |reader: Option<thread::JoinHandle<Vec<u8>>>| {
        reader
            .and_then(|handle| handle.join().ok())
            .map(|buf| tail(&buf))
            .unwrap_or_default()
    };

    match wait_until(&mut child, timeout.map(|t| Instant::now() + t)) {
        Ok(Some(code)) => ProcessExit::Exited {
            code,
            stderr: collect(reader),
        },
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            // Grandchildren may still hold the pipe open; don't wait on them.
            thread::sleep(POLL_INTERVAL);
            let reader = reader.filter(|handle| handle.is_finished());
            ProcessExit::TimedOut {
                stderr: collect(reader),
            }
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            ProcessExit::Exited {
                code: None,
                stderr: format!("failed to wait for engine: {e}"),
            }
        }
    }
}

/// `Ok(Some(code))` once the child exits, `Ok(None)` if the deadline passes first.
fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<Option<i32>>> {
    let Some(deadline) = deadline else {
        return child.wait().map(|status| Some(status.code()));
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status.code()));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn tail(buf: &[u8]) -> String {
    let start = buf.len().saturating_sub(STDERR_LIMIT);
    String::from_utf8_lossy(&buf[start..]).trim().to_string()
}
