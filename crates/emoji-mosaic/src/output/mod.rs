//! Mosaic output type.

mod mosaic;

pub use mosaic::Mosaic;
