//! Per-cell emoji matching.
//!
//! Two matchers implement [`EmojiMatch`]:
//!
//! - [`StructuralMatcher`]: exact weighted distance over full feature grids
//! - [`CompressedMatcher`]: squared L2 distance over PCA embeddings, a
//!   cheaper approximation
//!
//! Both share the same ranking: an optional recent-use penalty, a stable
//! sort, and diversity sampling among the closest `K` entries with weights
//! `1 / sqrt(d / minDist + 0.1)`. All randomness comes from the caller's
//! generator.

mod compressed;
mod options;
mod ranking;
mod recent;
mod structural;

pub use compressed::CompressedMatcher;
pub use options::{MatchMode, MatchOptions};
pub use recent::RecentlyUsed;
pub use structural::{
    color_distance, grayscale_distance, StructuralMatcher, ALPHA_WEIGHT, SATURATION_WEIGHT,
};

use rand::Rng;

use crate::api::ConfigurationError;
use crate::color::Rgb;
use crate::corpus::{BackgroundId, FeatureGrid};
use crate::output::Mosaic;
use crate::sample::{extract_grid, MosaicLayout, SourceImage};

/// The chosen entry for one source grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub character: String,
    /// Distance after any recent-use penalty
    pub distance: f32,
    /// Corpus index of the entry
    pub index: usize,
}

/// Common interface of the structural and compressed matchers.
pub trait EmojiMatch {
    /// Side length of the grids this matcher accepts.
    fn grid_size(&self) -> usize;

    /// Resolve a background name against the matcher's corpus.
    fn background_id(&self, name: &str) -> Result<BackgroundId, ConfigurationError>;

    /// Find the entry that best reproduces `grid` on `background`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::GridSizeMismatch`] if `grid` does not have the
    /// corpus cell count.
    fn find_match<R: Rng + ?Sized>(
        &self,
        grid: &FeatureGrid,
        background: BackgroundId,
        options: &MatchOptions,
        recent: Option<&RecentlyUsed>,
        rng: &mut R,
    ) -> Result<MatchResult, ConfigurationError>;
}

/// Match every cell of `layout` against `matcher`, row-major.
///
/// Blocks are composited over `backdrop`. When `options.avoid_recent` is
/// non-zero the last that many choices are penalised.
pub fn image_to_mosaic<M, R>(
    matcher: &M,
    image: &SourceImage,
    layout: &MosaicLayout,
    background: BackgroundId,
    backdrop: Rgb,
    options: &MatchOptions,
    rng: &mut R,
) -> Result<Mosaic, ConfigurationError>
where
    M: EmojiMatch + ?Sized,
    R: Rng + ?Sized,
{
    let grid_size = matcher.grid_size();
    let mut recent = (options.avoid_recent > 0).then(|| RecentlyUsed::new(options.avoid_recent));
    let mut cells = Vec::with_capacity(layout.cell_count());

    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let (x, y) = layout.block_origin(col, row);
            let grid = extract_grid(
                image,
                x,
                y,
                layout.block_width,
                layout.block_height,
                grid_size,
                backdrop,
            );
            let result = matcher.find_match(&grid, background, options, recent.as_ref(), rng)?;
            if let Some(recent) = recent.as_mut() {
                recent.push(result.index);
            }
            cells.push(result.character);
        }
    }

    Ok(Mosaic::new(cells, layout.cols, layout.rows))
}
