//! Precomputed glyph data consumed by the matchers and the diffuser.
//!
//! - [`FeatureGrid`] / [`Cell`]: one glyph rendered on one background,
//!   sampled into an N×N grid of RGBLA cells.
//! - [`Corpus`]: every glyph with a grid per background, resolved at load
//!   time into contiguous arrays indexed by [`BackgroundId`].
//! - [`EmbeddingCorpus`] / [`PcaBasis`]: the PCA-compressed form used by
//!   the compressed matcher.

mod corpus;
mod embedding;
mod feature_grid;
pub(crate) mod schema;

pub use corpus::{BackgroundId, Corpus, CorpusEntry, EntryMeta, GlyphStats};
pub use embedding::{project, EmbeddingCorpus, PcaBasis};
pub use feature_grid::{Cell, FeatureGrid, CHANNELS};
