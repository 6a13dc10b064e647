//! The mosaic grid passed between pipeline stages.
//!
//! Stages never share a [`Mosaic`]: each one takes the previous result by
//! reference and returns a fresh value, so a caller can always compare
//! before and after.

use std::fmt;

/// A row-major grid of glyphs.
///
/// # Example
///
/// ```
/// use emoji_mosaic::Mosaic;
///
/// let mosaic = Mosaic::from_rows(vec![
///     vec!["⬜".to_string(), "⬛".to_string()],
///     vec!["⬛".to_string(), "⬜".to_string()],
/// ]);
/// assert_eq!(mosaic.to_string(), "⬜⬛\n⬛⬜");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mosaic {
    /// Glyphs, one per cell, row-major.
    cells: Vec<String>,
    cols: usize,
    rows: usize,
}

impl Mosaic {
    /// Create a mosaic filled with `fill`.
    pub fn filled(cols: usize, rows: usize, fill: &str) -> Self {
        Self {
            cells: vec![fill.to_string(); cols * rows],
            cols,
            rows,
        }
    }

    /// Create a mosaic from row-major cells.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `cells.len() == cols * rows`.
    pub fn new(cells: Vec<String>, cols: usize, rows: usize) -> Self {
        debug_assert_eq!(
            cells.len(),
            cols * rows,
            "cells length ({}) must match cols * rows ({}x{})",
            cells.len(),
            cols,
            rows,
        );
        Self { cells, cols, rows }
    }

    /// Create a mosaic from nested rows.
    ///
    /// The first row sets the width. Shorter rows are padded with empty
    /// strings and longer rows are truncated to that width.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let row_count = rows.len();
        let mut cells = Vec::with_capacity(cols * row_count);
        for mut row in rows {
            row.resize(cols, String::new());
            cells.extend(row);
        }
        Self {
            cells,
            cols,
            rows: row_count,
        }
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
    pub fn get(&self, col: usize, row: usize) -> &str {
        &self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, glyph: impl Into<String>) {
        self.cells[row * self.cols + col] = glyph.into();
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Iterate over rows as slices.
    pub fn row_slices(&self) -> impl Iterator<Item = &[String]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// Number of cells whose glyph differs from `other`.
    ///
    /// Mosaics of different dimensions compare as entirely different.
    pub fn diff_count(&self, other: &Mosaic) -> usize {
        if self.cols != other.cols || self.rows != other.rows {
            return self.cells.len().max(other.cells.len());
        }
        self.cells
            .iter()
            .zip(&other.cells)
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl fmt::Display for Mosaic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.row_slices().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for glyph in row {
                f.write_str(glyph)?;
            }
        }
        Ok(())
    }
}
