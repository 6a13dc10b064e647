//! Area-weighted resampling.
//!
//! Every output sample is the exact overlap-weighted mean of the source
//! pixels under it, with fractional coverage at the edges. Nearest-neighbour
//! sampling would alias thin features in and out of the grid.

use super::image::SourceImage;
use crate::color::Rgb;
use crate::corpus::{Cell, FeatureGrid};

/// Mean premultiplied colour and coverage of a source region.
///
/// Area outside the image counts as fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coverage {
    /// Colour already multiplied by its alpha
    pub premultiplied: Rgb,
    /// Mean alpha in `0.0..=1.0`
    pub alpha: f32,
}

impl Coverage {
    /// Composite over an opaque background.
    #[inline]
    pub fn over(self, background: Rgb) -> Rgb {
        self.premultiplied + background * (1.0 - self.alpha)
    }
}

fn area_average(image: &SourceImage, x0: f32, y0: f32, x1: f32, y1: f32) -> Coverage {
    let area = (x1 - x0) * (y1 - y0);
    if area <= 0.0 {
        return Coverage::default();
    }

    let px_lo = x0.floor().max(0.0) as u32;
    let py_lo = y0.floor().max(0.0) as u32;
    let px_hi = (x1.ceil().max(0.0) as u32).min(image.width());
    let py_hi = (y1.ceil().max(0.0) as u32).min(image.height());

    let mut color = Rgb::BLACK;
    let mut alpha = 0.0;
    for py in py_lo..py_hi {
        let wy = (y1.min(py as f32 + 1.0) - y0.max(py as f32)).max(0.0);
        for px in px_lo..px_hi {
            let wx = (x1.min(px as f32 + 1.0) - x0.max(px as f32)).max(0.0);
            let w = wx * wy;
            if w == 0.0 {
                continue;
            }
            let [r, g, b, a] = image.pixel(px, py);
            let a = a as f32 / 255.0;
            color = color + Rgb::from_u8(r, g, b) * (a * w);
            alpha += a * w;
        }
    }

    Coverage {
        premultiplied: color * (1.0 / area),
        alpha: alpha / area,
    }
}

/// Resample the region `width`×`height` at `(x, y)` to `out_w`×`out_h`
/// samples, row-major.
pub fn resample_area(
    image: &SourceImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    out_w: usize,
    out_h: usize,
) -> Vec<Coverage> {
    let sx = width / out_w.max(1) as f32;
    let sy = height / out_h.max(1) as f32;
    let mut out = Vec::with_capacity(out_w * out_h);
    for oy in 0..out_h {
        let y0 = y + oy as f32 * sy;
        for ox in 0..out_w {
            let x0 = x + ox as f32 * sx;
            out.push(area_average(image, x0, y0, x0 + sx, y0 + sy));
        }
    }
    out
}

/// Sample one mosaic block into a `grid_size`×`grid_size` feature grid.
///
/// Colour is composited over `background`, the way corpus glyphs were
/// rendered; `a` keeps the mean source alpha so transparent regions weigh
/// less in matching.
///
/// # Example
///
/// ```
/// use emoji_mosaic::{extract_grid, Rgb, SourceImage};
///
/// let image = SourceImage::solid(8, 8, Rgb::new(1.0, 0.0, 0.0));
/// let grid = extract_grid(&image, 0.0, 0.0, 8.0, 8.0, 4, Rgb::WHITE);
/// assert_eq!(grid.cell_count(), 16);
/// assert!((grid.cell(3, 3).r - 1.0).abs() < 1e-6);
/// ```
pub fn extract_grid(
    image: &SourceImage,
    x: f32,
    y: f32,
    block_width: f32,
    block_height: f32,
    grid_size: usize,
    background: Rgb,
) -> FeatureGrid {
    let samples = resample_area(image, x, y, block_width, block_height, grid_size, grid_size);
    let mut samples = samples.into_iter();
    FeatureGrid::from_fn(grid_size, |_, _| {
        let s = samples.next().unwrap_or_default();
        Cell::from_rgb(s.over(background), s.alpha)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_area_weighting_is_fractional() {
        // Left half black, right half white, sampled at 1x1
        let image = SourceImage::from_fn(2, 1, |x, _| {
            let v = if x == 0 { 0 } else { 255 };
            [v, v, v, 255]
        });
        let out = resample_area(&image, 0.0, 0.0, 2.0, 1.0, 1, 1);
        assert!(approx(out[0].premultiplied.r, 0.5));
        assert!(approx(out[0].alpha, 1.0));

        // Samples straddling the pixel boundary
        let out = resample_area(&image, 0.5, 0.0, 1.0, 1.0, 1, 1);
        assert!(approx(out[0].premultiplied.r, 0.5));
        let out = resample_area(&image, 0.75, 0.0, 1.0, 1.0, 1, 1);
        assert!(approx(out[0].premultiplied.r, 0.75));
    }

    #[test]
    fn test_outside_image_is_transparent() {
        let image = SourceImage::solid(2, 2, Rgb::WHITE);
        let out = resample_area(&image, 1.0, 0.0, 2.0, 2.0, 1, 1);
        assert!(approx(out[0].alpha, 0.5));
        assert!(approx(out[0].over(Rgb::BLACK).r, 0.5));
    }

    #[test]
    fn test_extract_grid_keeps_structure() {
        // 8x8 checkerboard of 2x2 pixel squares resolves on a 4x4 grid
        let image = SourceImage::from_fn(8, 8, |x, y| {
            let v = if (x / 2 + y / 2) % 2 == 0 { 0 } else { 255 };
            [v, v, v, 255]
        });
        let grid = extract_grid(&image, 0.0, 0.0, 8.0, 8.0, 4, Rgb::WHITE);
        assert!(approx(grid.cell(0, 0).l, 0.0));
        assert!(approx(grid.cell(1, 0).l, 1.0));
        assert!(approx(grid.average_luminance(), 0.5));
    }

    #[test]
    fn test_extract_grid_composites_over_background() {
        let image = SourceImage::from_fn(4, 4, |_, _| [0, 0, 0, 0]);
        let bg = Rgb::from_u8(0x00, 0x7A, 0xFF);
        let grid = extract_grid(&image, 0.0, 0.0, 4.0, 4.0, 2, bg);
        let cell = grid.cell(1, 1);
        assert!(approx(cell.b, 1.0));
        assert!(approx(cell.a, 0.0));
    }
}
