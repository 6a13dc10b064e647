//! emoji-mosaic: render images as grids of emoji
//!
//! The library matches image blocks against a precomputed corpus of emoji
//! feature grids and optionally improves the result with two passes: a
//! 2×2 quad refiner driven by a pattern codebook, and a multi-channel
//! annealing diffuser.
//!
//! # Quick Start
//!
//! The [`EmojiMosaic`] builder is the primary entry point:
//!
//! ```
//! use emoji_mosaic::{Cell, Corpus, CorpusEntry, EmojiMosaic, FeatureGrid, SourceImage};
//!
//! let solid = |v: f32| FeatureGrid::uniform(2, Cell::new(v, v, v, 1.0));
//! let corpus = Corpus::from_entries(
//!     2,
//!     vec!["white".into()],
//!     vec![
//!         CorpusEntry::new("⬜").with_grid("white", solid(1.0)),
//!         CorpusEntry::new("⬛").with_grid("white", solid(0.0)),
//!     ],
//! )
//! .unwrap();
//!
//! let image = SourceImage::from_fn(4, 4, |_, y| {
//!     let v = if y < 2 { 255 } else { 0 };
//!     [v, v, v, 255]
//! });
//! let report = EmojiMosaic::new(&corpus).columns(1).seed(1).render(&image).unwrap();
//! assert_eq!(report.mosaic.rows(), 1);
//! ```
//!
//! # Artifacts
//!
//! Three JSON artifacts are produced offline and loaded read-only:
//!
//! - [`Corpus`]: per-background feature grids (`r`, `g`, `b`, `l`, `a` per
//!   cell) plus glyph metadata
//! - [`EmbeddingCorpus`]: PCA bases and projected embeddings for the
//!   compressed matcher
//! - [`QuadCodebook`]: 16×16 reference patterns mapped to ranked 2×2 glyph
//!   blocks
//!
//! # Matching
//!
//! Two interchangeable matchers implement [`EmojiMatch`]:
//!
//! - [`StructuralMatcher`]: weighted per-cell distance over RGB,
//!   saturation and alpha, scaled by source opacity
//! - [`CompressedMatcher`]: squared Euclidean distance in PCA space
//!
//! Both support diversity sampling and a recently-used penalty through
//! [`MatchOptions`].
//!
//! # Pipeline
//!
//! ```text
//! RGBA image
//!     |
//!     v
//! MosaicLayout           (cols × rows blocks)
//!     |
//!     v
//! FeatureGrid per block  (area resample, composite over background)
//!     |
//!     v
//! EmojiMatch             (structural or compressed)
//!     |
//!     v
//! QuadRefiner            (optional, 2×2 codebook replacement)
//!     |
//!     v
//! JaDiffuser             (optional, annealed multi-channel rescoring)
//!     |
//!     v
//! Mosaic
//! ```
//!
//! All randomness is drawn from a caller-supplied [`rand::Rng`], so a seeded
//! generator gives reproducible output.

pub mod api;
pub mod color;
pub mod corpus;
pub mod diffuse;
pub mod matcher;
pub mod output;
pub mod refine;
pub mod sample;

#[cfg(test)]
mod domain_tests;

pub use api::{ConfigurationError, DiffusionSummary, EmojiMosaic, MosaicError, MosaicReport};
pub use color::{background_color, known_backgrounds, ParseColorError, Rgb};
pub use corpus::{
    project, BackgroundId, Cell, Corpus, CorpusEntry, EmbeddingCorpus, EntryMeta, FeatureGrid,
    PcaBasis,
};
pub use diffuse::{
    ChannelWeights, DiffuseOutcome, DiffuserOptions, IterationReport, JaDiffuser, SourceFeatures,
};
pub use matcher::{
    image_to_mosaic, CompressedMatcher, EmojiMatch, MatchMode, MatchOptions, MatchResult,
    RecentlyUsed, StructuralMatcher,
};
pub use output::Mosaic;
pub use refine::{QuadCodebook, QuadRefiner, RefineOutcome, RefinePolicy, RefineStatus};
pub use sample::{extract_grid, MosaicLayout, SourceImage};
