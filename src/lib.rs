//! Emojify
//!
//! Command-line front end for the emoji-mosaic engine.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
