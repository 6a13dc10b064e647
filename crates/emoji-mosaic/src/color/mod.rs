//! Colour types shared by every stage of the mosaic pipeline.
//!
//! All arithmetic happens on gamma-encoded channels normalised to
//! `0.0..=1.0`. The corpus feature grids were extracted from rendered glyphs
//! in that space, so source pixels are compared in the same space without
//! any linearisation.
//!
//! # Example
//!
//! ```
//! use emoji_mosaic::Rgb;
//!
//! let blue: Rgb = "#007AFF".parse().unwrap();
//! assert!(blue.saturation() > 0.99);
//! assert!((Rgb::WHITE.luminance() - 1.0).abs() < 1e-6);
//! ```

mod background;
mod error;
mod rgb;

pub use background::{background_color, known_backgrounds, KNOWN_BACKGROUNDS};
pub use error::ParseColorError;
pub use rgb::{luminance, saturation, Rgb};
