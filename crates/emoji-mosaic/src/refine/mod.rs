//! 2×2 quad refinement against a precomputed pattern codebook.

mod codebook;
mod quad;

pub use codebook::{CodebookPattern, PatternCategory, Quad, QuadCodebook, PATTERN_SIZE};
pub use quad::{
    reference_block, QuadRefiner, RefineOutcome, RefinePolicy, RefineStatus,
    DEFAULT_SELECTIVE_THRESHOLD,
};
