//! Source image sampling.
//!
//! Turns decoded RGBA pixels into the per-cell inputs of the pipeline: the
//! mosaic layout, area-weighted resampling and N×N feature grids composited
//! over a background colour.

mod image;
mod layout;
mod resample;

pub use image::SourceImage;
pub use layout::MosaicLayout;
pub use resample::{extract_grid, resample_area, Coverage};
