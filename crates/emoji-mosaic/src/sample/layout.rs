//! Mosaic geometry: how many cells, and which source pixels each covers.

use std::ops::Range;

use super::image::SourceImage;

/// Cell counts and per-cell block size for one conversion.
///
/// Blocks are fractional; cell `(col, row)` starts at
/// `floor(col * block_width), floor(row * block_height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MosaicLayout {
    pub cols: usize,
    pub rows: usize,
    pub block_width: f32,
    pub block_height: f32,
}

impl MosaicLayout {
    /// Layout for an image `width`×`height` rendered `columns` glyphs wide.
    ///
    /// `emoji_aspect` corrects for glyphs that are not square in the target
    /// font: 1.0 keeps square cells, 0.5 halves the row count. Both counts
    /// are at least 1.
    ///
    /// # Example
    ///
    /// ```
    /// use emoji_mosaic::MosaicLayout;
    ///
    /// let layout = MosaicLayout::new(200, 100, 20, 1.0);
    /// assert_eq!((layout.cols, layout.rows), (20, 10));
    /// assert_eq!(layout.block_width, 10.0);
    /// ```
    pub fn new(width: u32, height: u32, columns: usize, emoji_aspect: f32) -> Self {
        let cols = columns.max(1);
        let aspect = height as f32 / width.max(1) as f32;
        let rows = ((cols as f32 * aspect * emoji_aspect).round() as usize).max(1);
        Self {
            cols,
            rows,
            block_width: width as f32 / cols as f32,
            block_height: height as f32 / rows as f32,
        }
    }

    /// Layout fitted to `image`.
    pub fn for_image(image: &SourceImage, columns: usize, emoji_aspect: f32) -> Self {
        Self::new(image.width(), image.height(), columns, emoji_aspect)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Top-left source pixel of cell `(col, row)`.
    #[inline]
    pub fn block_origin(&self, col: usize, row: usize) -> (f32, f32) {
        (
            (col as f32 * self.block_width).floor(),
            (row as f32 * self.block_height).floor(),
        )
    }

    /// Whole source pixels covered by `span` consecutive cells starting at
    /// `(col, row)`, clipped to the image. The last row and column extend to
    /// the image edge. Never empty for a cell inside the layout of that
    /// image. An image without pixels yields empty ranges.
    pub fn pixel_span(
        &self,
        image: &SourceImage,
        col: usize,
        row: usize,
        span: usize,
    ) -> (Range<u32>, Range<u32>) {
        let axis = |start: usize, count: usize, block: f32, limit: u32| {
            if limit == 0 {
                return 0..0;
            }
            let lo = ((start as f32 * block).floor() as u32).min(limit.saturating_sub(1));
            let hi = if start + span >= count {
                limit
            } else {
                ((start + span) as f32 * block).floor() as u32
            };
            lo..hi.clamp(lo + 1, limit)
        };
        (
            axis(col, self.cols, self.block_width, image.width()),
            axis(row, self.rows, self.block_height, image.height()),
        )
    }
}
