//! Public API for the emoji-mosaic crate.
//!
//! This module provides the high-level API: the [`EmojiMosaic`] builder and
//! the [`MosaicError`] unified error type.

mod builder;
mod error;

pub use builder::{DiffusionSummary, EmojiMosaic, MosaicReport};
pub use error::{ConfigurationError, MosaicError};
