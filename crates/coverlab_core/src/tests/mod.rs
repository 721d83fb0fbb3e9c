//! Integration tests for the coverlab harness
//!
//! Tests are organized by topic:
//! - `codecs` - Tag and cell codec properties
//! - `expansion` - Parameter space expansion and sweep designs
//! - `aggregation` - Report normalization and summary statistics
//! - `dispatch` - Geometry caching and engine invocation against fake engines
//! - `orchestration` - End-to-end sweeps, persistence and series export
//!
//! The fake engines are shell scripts, so the last two only run on unix.

mod codecs;
mod expansion;

#[cfg(unix)]
mod dispatch;
#[cfg(unix)]
mod fixtures;
