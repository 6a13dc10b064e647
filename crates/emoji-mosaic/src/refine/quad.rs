//! Quad refiner.
//!
//! Walks the mosaic in 2×2 steps. For each aligned block the source region
//! under those four cells is area-resampled to a 16×16 reference, the
//! nearest codebook pattern is found, and the four cells are overwritten
//! with one of that pattern's quads according to the [`RefinePolicy`]. A
//! trailing odd row or column is never touched.

use rand::Rng;

use super::codebook::{QuadCodebook, PATTERN_SIZE};
use crate::api::ConfigurationError;
use crate::color::{background_color, Rgb};
use crate::output::Mosaic;
use crate::sample::{resample_area, MosaicLayout, SourceImage};

/// Selective threshold on a quad's stored distance.
pub const DEFAULT_SELECTIVE_THRESHOLD: f32 = 0.8;

/// How many of a pattern's best quads the unconditional policy picks from.
const UNCONDITIONAL_TOP: usize = 3;

/// When a block is overwritten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefinePolicy {
    /// Always replace with a uniform pick among the pattern's top 3 quads.
    Unconditional,
    /// Replace with the best quad only when its stored distance is below
    /// `threshold`.
    Selective { threshold: f32 },
}

impl Default for RefinePolicy {
    fn default() -> Self {
        Self::Selective {
            threshold: DEFAULT_SELECTIVE_THRESHOLD,
        }
    }
}

/// Whether refinement ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStatus {
    Applied,
    /// No codebook is loaded; the mosaic is returned unchanged.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefineOutcome {
    pub mosaic: Mosaic,
    /// Number of 2×2 blocks overwritten
    pub replaced: usize,
    pub status: RefineStatus,
}

/// Area-resample the source under the 2×2 block at `(col, row)` to a
/// `PATTERN_SIZE`×`PATTERN_SIZE` reference, composited over `backdrop`.
pub fn reference_block(
    image: &SourceImage,
    layout: &MosaicLayout,
    col: usize,
    row: usize,
    backdrop: Rgb,
) -> Vec<Rgb> {
    let (x, y) = layout.block_origin(col, row);
    resample_area(
        image,
        x,
        y,
        layout.block_width * 2.0,
        layout.block_height * 2.0,
        PATTERN_SIZE,
        PATTERN_SIZE,
    )
    .into_iter()
    .map(|s| s.over(backdrop))
    .collect()
}

/// Optional 2×2 refinement stage.
///
/// # Example
///
/// ```
/// use emoji_mosaic::{Mosaic, MosaicLayout, QuadRefiner, RefinePolicy, RefineStatus, Rgb,
///     SourceImage};
/// use rand::SeedableRng;
///
/// let refiner = QuadRefiner::new(None);
/// let image = SourceImage::solid(4, 4, Rgb::WHITE);
/// let layout = MosaicLayout::for_image(&image, 2, 1.0);
/// let mosaic = Mosaic::filled(2, 2, "⬜");
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
///
/// let outcome = refiner
///     .refine(&mosaic, &image, &layout, RefinePolicy::Unconditional, &mut rng)
///     .unwrap();
/// assert_eq!(outcome.status, RefineStatus::Skipped);
/// assert_eq!(outcome.mosaic, mosaic);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QuadRefiner<'a> {
    codebook: Option<&'a QuadCodebook>,
}

impl<'a> QuadRefiner<'a> {
    pub fn new(codebook: Option<&'a QuadCodebook>) -> Self {
        Self { codebook }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.codebook.is_some()
    }

    /// Refine `mosaic` against `image`.
    ///
    /// Returns a new mosaic; the input is never modified.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::LayoutMismatch`] if the mosaic does not have
    /// the layout's dimensions.
    pub fn refine<R: Rng + ?Sized>(
        &self,
        mosaic: &Mosaic,
        image: &SourceImage,
        layout: &MosaicLayout,
        policy: RefinePolicy,
        rng: &mut R,
    ) -> Result<RefineOutcome, ConfigurationError> {
        let Some(codebook) = self.codebook else {
            tracing::warn!("Quad codebook not loaded, skipping refinement");
            return Ok(RefineOutcome {
                mosaic: mosaic.clone(),
                replaced: 0,
                status: RefineStatus::Skipped,
            });
        };
        if mosaic.cols() != layout.cols || mosaic.rows() != layout.rows {
            return Err(ConfigurationError::LayoutMismatch {
                cols: layout.cols,
                rows: layout.rows,
                actual_cols: mosaic.cols(),
                actual_rows: mosaic.rows(),
            });
        }

        let backdrop = background_color(codebook.background()).unwrap_or(Rgb::WHITE);
        let mut refined = mosaic.clone();
        let mut replaced = 0;
        let mut blocks = 0;

        for row in (0..layout.rows.saturating_sub(1)).step_by(2) {
            for col in (0..layout.cols.saturating_sub(1)).step_by(2) {
                blocks += 1;
                let reference = reference_block(image, layout, col, row, backdrop);
                let Some(pattern) = codebook.nearest_pattern(&reference) else {
                    continue;
                };
                if pattern.quads.is_empty() {
                    continue;
                }

                let quad = match policy {
                    RefinePolicy::Unconditional => {
                        let top = pattern.quads.len().min(UNCONDITIONAL_TOP);
                        &pattern.quads[rng.gen_range(0..top)]
                    }
                    RefinePolicy::Selective { threshold } => {
                        let best = &pattern.quads[0];
                        if best.dist >= threshold {
                            continue;
                        }
                        best
                    }
                };

                let [tl, tr, bl, br] = &quad.chars;
                refined.set(col, row, tl.as_str());
                refined.set(col + 1, row, tr.as_str());
                refined.set(col, row + 1, bl.as_str());
                refined.set(col + 1, row + 1, br.as_str());
                replaced += 1;
            }
        }

        tracing::debug!(replaced, blocks, ?policy, "Quad refinement applied");
        Ok(RefineOutcome {
            mosaic: refined,
            replaced,
            status: RefineStatus::Applied,
        })
    }
}
