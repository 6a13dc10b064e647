//! Unified error types for the emoji-mosaic public API.
//!
//! Only fatal conditions are errors. Optional stages that lack their data
//! (codebook not loaded, no embedding basis) report a skipped status
//! instead, and stale mosaic cells are recovered where they are found.

/// Caller or artifact mistakes that make a request impossible to serve.
///
/// These are never retried; they surface to the caller immediately.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Source grid cell count differs from the corpus grid cell count.
    #[error("source grid has {actual} cells but corpus grids have {expected}")]
    GridSizeMismatch {
        /// Cells per corpus grid (`gridSize²`)
        expected: usize,
        /// Cells in the offending grid
        actual: usize,
    },

    /// Background name not present in the corpus (or codebook).
    #[error("background '{0}' is not present in the corpus")]
    UnknownBackground(String),

    /// Embedding or basis vector length differs from the declared dimension.
    #[error("embedding has {actual} dimensions, expected {expected}")]
    EmbeddingDimMismatch {
        /// Declared length
        expected: usize,
        /// Observed length
        actual: usize,
    },

    /// Corpus without any entries.
    #[error("corpus contains no entries")]
    EmptyCorpus,

    /// Pixel buffer length does not match `width * height * 4`.
    #[error("image buffer of {len} bytes does not fit {width}x{height} RGBA")]
    InvalidImage {
        width: u32,
        height: u32,
        len: usize,
    },

    /// Mosaic dimensions differ from the layout it is refined against.
    #[error("mosaic is {actual_cols}x{actual_rows} but layout is {cols}x{rows}")]
    LayoutMismatch {
        cols: usize,
        rows: usize,
        actual_cols: usize,
        actual_rows: usize,
    },

    /// Structurally invalid artifact (missing grids, wrong cell counts, ...).
    #[error("invalid artifact: {0}")]
    InvalidCorpus(String),
}

/// Unified error type for the emoji-mosaic public API.
///
/// Wraps every fatal error of the crate into a single enum for convenient
/// `?` propagation in application code.
///
/// # Example
///
/// ```
/// use emoji_mosaic::{Corpus, MosaicError};
///
/// fn load(bytes: &[u8]) -> Result<Corpus, MosaicError> {
///     let corpus = Corpus::from_json(bytes)?;
///     Ok(corpus)
/// }
///
/// assert!(load(b"not json").is_err());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    /// Grid size, background or artifact shape problem
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Artifact bytes are not valid JSON for the expected schema
    #[error("failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),
}
