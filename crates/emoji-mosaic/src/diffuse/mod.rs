//! Multi-channel annealing diffuser.
//!
//! Post-processes a finished mosaic by re-scoring every cell against four
//! weighted channels and diffusing the residual colour error of changed
//! cells to their Floyd-Steinberg neighbours, like an error-diffusion
//! ditherer working on glyphs instead of palette colours.
//!
//! # Architecture
//!
//! [`SourceFeatures`] holds the per-cell source summary and the error
//! accumulators; it is owned by a single run and passed by reference into
//! every cell update. [`JaDiffuser`] holds the corpus and the
//! [`DiffuserOptions`] and is immutable while it runs.

mod features;
mod ja;
mod kernel;
mod options;

pub use features::{Contrast, SourceCell, SourceFeatures, Texture, TextureClass};
pub use ja::{CellUpdate, DiffuseOutcome, IterationReport, JaDiffuser};
pub use kernel::{Kernel, FLOYD_STEINBERG};
pub use options::{ChannelWeights, DiffuserOptions};
