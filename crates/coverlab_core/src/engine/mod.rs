//! The boundary with the external coverage engine.
//!
//! The engine is an opaque executable. Each run gets a geometry CSV, an
//! archive CSV and an output path on its command line, and is expected to
//! leave a JSON report at that path.

mod dispatcher;
mod invocation;
mod process;

pub use dispatcher::{EngineStatus, RunDispatcher, RunOutcome};
pub use invocation::{Invocation, RunPaths};
pub use process::{ProcessExit, run_to_completion};
