//! RGBLA feature grids.

use crate::api::ConfigurationError;
use crate::color::{luminance, Rgb};

/// Number of `f32` channels per flattened cell: r, g, b, l, a.
pub const CHANNELS: usize = 5;

/// One sample of a feature grid.
///
/// Colour channels are alpha-composited against the background the grid was
/// rendered on. `l` is always derived from `r`, `g`, `b`; `a` is the
/// coverage before compositing (0 means the sample was fully transparent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub l: f32,
    pub a: f32,
}

impl Cell {
    /// Create a cell, deriving luminance from the colour channels.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            l: luminance(r, g, b),
            a,
        }
    }

    #[inline]
    pub fn from_rgb(color: Rgb, a: f32) -> Self {
        Self::new(color.r, color.g, color.b, a)
    }

    #[inline]
    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// A square grid of [`Cell`]s, row-major.
///
/// # Example
///
/// ```
/// use emoji_mosaic::{Cell, FeatureGrid};
///
/// let grid = FeatureGrid::uniform(4, Cell::new(0.5, 0.5, 0.5, 1.0));
/// assert_eq!(grid.cell_count(), 16);
/// assert_eq!(grid.flatten().len(), 16 * 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGrid {
    size: usize,
    cells: Vec<Cell>,
}

impl FeatureGrid {
    /// Wrap `cells` as a `size`×`size` grid.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::GridSizeMismatch`] if `cells.len() != size²`.
    pub fn new(size: usize, cells: Vec<Cell>) -> Result<Self, ConfigurationError> {
        if cells.len() != size * size {
            return Err(ConfigurationError::GridSizeMismatch {
                expected: size * size,
                actual: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> Cell) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                cells.push(f(x, y));
            }
        }
        Self { size, cells }
    }

    pub fn uniform(size: usize, cell: Cell) -> Self {
        Self {
            size,
            cells: vec![cell; size * size],
        }
    }

    /// Rebuild a grid from its flattened `[r, g, b, l, a, ...]` form.
    pub(crate) fn from_flat(size: usize, flat: &[f32]) -> Self {
        let cells = flat
            .chunks_exact(CHANNELS)
            .map(|c| Cell {
                r: c[0],
                g: c[1],
                b: c[2],
                l: c[3],
                a: c[4],
            })
            .collect();
        Self { size, cells }
    }

    /// Side length N.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// N².
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[y * self.size + x]
    }

    /// Flatten to `[r, g, b, l, a]` per cell, the layout the matchers and
    /// the PCA basis operate on.
    pub fn flatten(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.cells.len() * CHANNELS);
        for c in &self.cells {
            flat.extend_from_slice(&[c.r, c.g, c.b, c.l, c.a]);
        }
        flat
    }

    /// Mean colour over all cells.
    pub fn average_color(&self) -> Rgb {
        let n = self.cells.len().max(1) as f32;
        let sum = self
            .cells
            .iter()
            .fold(Rgb::BLACK, |acc, c| acc + c.rgb());
        sum * (1.0 / n)
    }

    pub fn average_luminance(&self) -> f32 {
        let n = self.cells.len().max(1) as f32;
        self.cells.iter().map(|c| c.l).sum::<f32>() / n
    }

    pub fn average_alpha(&self) -> f32 {
        let n = self.cells.len().max(1) as f32;
        self.cells.iter().map(|c| c.a).sum::<f32>() / n
    }

    /// Population variance of cell luminance around its mean.
    pub fn luminance_variance(&self) -> f32 {
        let mean = self.average_luminance();
        let n = self.cells.len().max(1) as f32;
        self.cells
            .iter()
            .map(|c| (c.l - mean) * (c.l - mean))
            .sum::<f32>()
            / n
    }
}
