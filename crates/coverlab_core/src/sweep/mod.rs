//! Parameter sweep expansion.
//!
//! A sweep starts from a [`ParameterSpace`](crate::model::ParameterSpace):
//! parameter names mapped to candidate values. Expansion turns it into the
//! ordered list of [`RunConfig`](crate::model::RunConfig)s to execute.
//!
//! ```ignore
//! use coverlab_core::sweep::{SweepMode, expand};
//!
//! let space = ParameterSpace::new([
//!     ("delta", vec![0.0125.into(), 0.025.into(), 0.05.into()]),
//!     ("n_regions", vec![10.into()]),
//!     ("region_size", vec![0.25.into()]),
//!     ("archive_size", vec![1000.into()]),
//! ])?;
//!
//! // Vary delta, hold the rest
//! let expansion = expand(&space, SweepMode::SingleVariable)?;
//! assert_eq!(expansion.varying.as_deref(), Some("delta"));
//! ```
//!
//! Experiments that vary several parameters one at a time around shared
//! defaults use [`SweepDesign::OneAtATime`].

mod expand;
mod progress;

pub use expand::*;
pub use progress::*;
