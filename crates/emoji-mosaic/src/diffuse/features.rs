//! Per-cell source features the diffuser scores against.

use super::kernel::Kernel;
use crate::color::Rgb;
use crate::sample::{MosaicLayout, SourceImage};

const SOLID_MAX_GRADIENT: f32 = 0.1;
const SOLID_MAX_VARIANCE: f32 = 0.01;
const EDGE_MIN_GRADIENT: f32 = 0.4;

/// Texture class of a source block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureClass {
    /// Low luminance range and variance
    Solid,
    /// Luminance range above 0.4
    Edge,
    Gradient,
}

impl TextureClass {
    /// Classify from the luminance range and variance of a block.
    pub fn classify(gradient: f32, variance: f32) -> Self {
        if gradient < SOLID_MAX_GRADIENT && variance < SOLID_MAX_VARIANCE {
            Self::Solid
        } else if gradient > EDGE_MIN_GRADIENT {
            Self::Edge
        } else {
            Self::Gradient
        }
    }
}

/// Luminance extremes of a block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contrast {
    pub min: f32,
    pub max: f32,
    pub range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    /// Mean squared luminance deviation from the block's mid-range
    pub variance: f32,
    pub class: TextureClass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceCell {
    /// Mean block colour, composited over the background
    pub color: Rgb,
    pub luminance: f32,
    pub contrast: Contrast,
    pub texture: Texture,
    /// Accumulated diffusion error, written only by the forward pass
    pub error: Rgb,
}

impl SourceCell {
    /// Summarise a block from its composited pixel colours.
    pub fn from_pixels(pixels: &[Rgb]) -> Self {
        if pixels.is_empty() {
            return Self::uniform(Rgb::BLACK);
        }
        let n = pixels.len() as f32;
        let color = pixels.iter().fold(Rgb::BLACK, |acc, &p| acc + p) * (1.0 / n);

        let (min, max) = pixels
            .iter()
            .map(|p| p.luminance())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), l| {
                (lo.min(l), hi.max(l))
            });
        let mid = (min + max) / 2.0;
        let variance = pixels
            .iter()
            .map(|p| (p.luminance() - mid).powi(2))
            .sum::<f32>()
            / n;
        let range = max - min;

        Self {
            color,
            luminance: color.luminance(),
            contrast: Contrast { min, max, range },
            texture: Texture {
                variance,
                class: TextureClass::classify(range, variance),
            },
            error: Rgb::BLACK,
        }
    }

    /// A flat block of one colour.
    pub fn uniform(color: Rgb) -> Self {
        let l = color.luminance();
        Self {
            color,
            luminance: l,
            contrast: Contrast {
                min: l,
                max: l,
                range: 0.0,
            },
            texture: Texture {
                variance: 0.0,
                class: TextureClass::Solid,
            },
            error: Rgb::BLACK,
        }
    }

    /// Source colour plus accumulated error, clamped to the unit cube.
    #[inline]
    pub fn target(&self) -> Rgb {
        (self.color + self.error).clamp01()
    }
}

/// Source features for every mosaic cell, row-major.
///
/// Created once per diffuser run and owned by it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFeatures {
    cols: usize,
    rows: usize,
    cells: Vec<SourceCell>,
}

impl SourceFeatures {
    /// Sample every layout block of `image`, compositing over `backdrop`.
    pub fn extract(image: &SourceImage, layout: &MosaicLayout, backdrop: Rgb) -> Self {
        let mut cells = Vec::with_capacity(layout.cell_count());
        let mut pixels = Vec::new();
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let (xs, ys) = layout.pixel_span(image, col, row, 1);
                pixels.clear();
                for y in ys {
                    for x in xs.clone() {
                        pixels.push(image.composited(x, y, backdrop));
                    }
                }
                cells.push(SourceCell::from_pixels(&pixels));
            }
        }
        Self {
            cols: layout.cols,
            rows: layout.rows,
            cells,
        }
    }

    /// Build from precomputed cells, row-major.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `cells.len() == cols * rows`.
    pub fn from_cells(cols: usize, rows: usize, cells: Vec<SourceCell>) -> Self {
        debug_assert_eq!(cells.len(), cols * rows);
        Self { cols, rows, cells }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> &SourceCell {
        &self.cells[row * self.cols + col]
    }

    pub fn cells(&self) -> &[SourceCell] {
        &self.cells
    }

    /// Spread `error` from `(col, row)` to its kernel neighbours.
    ///
    /// Neighbours outside the grid are skipped, so edge cells lose the
    /// corresponding share.
    pub fn diffuse_error(&mut self, col: usize, row: usize, error: Rgb, kernel: &Kernel) {
        for (dx, dy, fraction) in kernel.fractions() {
            let nx = col as i64 + dx as i64;
            let ny = row as i64 + dy as i64;
            if nx < 0 || ny < 0 || nx >= self.cols as i64 || ny >= self.rows as i64 {
                continue;
            }
            let cell = &mut self.cells[ny as usize * self.cols + nx as usize];
            cell.error = cell.error + error * fraction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffuse::FLOYD_STEINBERG;

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(TextureClass::classify(0.05, 0.001), TextureClass::Solid);
        assert_eq!(TextureClass::classify(0.05, 0.02), TextureClass::Gradient);
        assert_eq!(TextureClass::classify(0.3, 0.0), TextureClass::Gradient);
        assert_eq!(TextureClass::classify(0.5, 0.1), TextureClass::Edge);
    }

    #[test]
    fn test_from_pixels_split_block_is_edge() {
        let pixels = [Rgb::WHITE, Rgb::WHITE, Rgb::BLACK, Rgb::BLACK];
        let cell = SourceCell::from_pixels(&pixels);
        assert!((cell.color.r - 0.5).abs() < 1e-6);
        assert!((cell.contrast.range - 1.0).abs() < 1e-6);
        // Deviation from the mid-range 0.5 is 0.5 for every pixel
        assert!((cell.texture.variance - 0.25).abs() < 1e-6);
        assert_eq!(cell.texture.class, TextureClass::Edge);
    }

    #[test]
    fn test_target_is_clamped() {
        let mut cell = SourceCell::uniform(Rgb::new(0.9, 0.5, 0.1));
        cell.error = Rgb::new(0.5, 0.0, -0.5);
        assert_eq!(cell.target(), Rgb::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_extract_from_image() {
        let image = SourceImage::from_fn(4, 2, |x, _| {
            let v = if x < 2 { 255 } else { 0 };
            [v, v, v, 255]
        });
        let layout = MosaicLayout::for_image(&image, 2, 1.0);
        let features = SourceFeatures::extract(&image, &layout, Rgb::WHITE);
        assert_eq!((features.cols(), features.rows()), (2, 1));
        assert_eq!(features.get(0, 0).color, Rgb::WHITE);
        assert_eq!(features.get(1, 0).color, Rgb::BLACK);
        assert_eq!(features.get(1, 0).texture.class, TextureClass::Solid);
    }

    #[test]
    fn test_diffusion_conserves_interior_error() {
        let mut features =
            SourceFeatures::from_cells(3, 2, vec![SourceCell::uniform(Rgb::BLACK); 6]);
        let residual = Rgb::new(0.32, -0.16, 0.08);
        features.diffuse_error(1, 0, residual, &FLOYD_STEINBERG);

        let total = features
            .cells()
            .iter()
            .fold(Rgb::BLACK, |acc, c| acc + c.error);
        assert!((total.r - residual.r).abs() < 1e-6);
        assert!((total.g - residual.g).abs() < 1e-6);
        assert!((total.b - residual.b).abs() < 1e-6);
        assert!((features.get(2, 0).error.r - 0.32 * 7.0 / 16.0).abs() < 1e-6);
        assert!((features.get(0, 1).error.r - 0.32 * 3.0 / 16.0).abs() < 1e-6);
    }

    #[test]
    fn test_diffusion_drops_out_of_grid_share() {
        let mut features =
            SourceFeatures::from_cells(2, 1, vec![SourceCell::uniform(Rgb::BLACK); 2]);
        features.diffuse_error(1, 0, Rgb::WHITE, &FLOYD_STEINBERG);
        assert_eq!(features.get(0, 0).error, Rgb::BLACK);
    }
}
