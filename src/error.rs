use std::path::PathBuf;

use emoji_mosaic::MosaicError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PNG decode error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("Unsupported PNG layout: {0}")]
    UnsupportedPng(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Mosaic error: {0}")]
    Mosaic(#[from] MosaicError),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<emoji_mosaic::ConfigurationError> for AppError {
    fn from(e: emoji_mosaic::ConfigurationError) -> Self {
        AppError::Mosaic(e.into())
    }
}
