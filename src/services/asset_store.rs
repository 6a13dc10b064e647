//! Offline artifact loading
//!
//! The feature corpus is required. The embedding corpus and quad codebook
//! are optional: when a path is given but the file cannot be loaded the
//! failure is logged and the matching stage runs without it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use emoji_mosaic::{Corpus, EmbeddingCorpus, MosaicError, QuadCodebook};

use crate::error::AppError;

/// Read-only artifacts shared by every render
#[derive(Debug)]
pub struct AssetStore {
    pub corpus: Corpus,
    pub embeddings: Option<EmbeddingCorpus>,
    pub codebook: Option<QuadCodebook>,
}

impl AssetStore {
    /// Load the artifacts from disk
    ///
    /// Fails only when the feature corpus cannot be loaded.
    pub fn load(
        corpus_path: &Path,
        embeddings_path: Option<&Path>,
        codebook_path: Option<&Path>,
    ) -> Result<Self, AppError> {
        let corpus = Self::load_corpus(corpus_path)?;
        tracing::info!(
            path = %corpus_path.display(),
            entries = corpus.len(),
            grid_size = corpus.grid_size(),
            backgrounds = corpus.backgrounds().len(),
            "Loaded feature corpus"
        );

        let embeddings = embeddings_path.and_then(|path| {
            load_optional(path, "embedding corpus", EmbeddingCorpus::from_reader)
        });
        if let Some(e) = &embeddings {
            tracing::info!(entries = e.len(), dim = e.dim(), "Loaded embedding corpus");
            if e.len() != corpus.len() {
                tracing::warn!(
                    embeddings = e.len(),
                    corpus = corpus.len(),
                    "Embedding corpus and feature corpus differ in size"
                );
            }
        }

        let codebook = codebook_path
            .and_then(|path| load_optional(path, "quad codebook", QuadCodebook::from_reader));

        Ok(Self {
            corpus,
            embeddings,
            codebook,
        })
    }

    /// Load only the feature corpus
    pub fn load_corpus(path: &Path) -> Result<Corpus, AppError> {
        let file = File::open(path).map_err(|e| AppError::io(path, e))?;
        Ok(Corpus::from_reader(BufReader::new(file))?)
    }

    /// Wrap already-loaded artifacts
    pub fn from_parts(
        corpus: Corpus,
        embeddings: Option<EmbeddingCorpus>,
        codebook: Option<QuadCodebook>,
    ) -> Self {
        Self {
            corpus,
            embeddings,
            codebook,
        }
    }
}

fn load_optional<T>(
    path: &Path,
    what: &str,
    parse: impl FnOnce(BufReader<File>) -> Result<T, MosaicError>,
) -> Option<T> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(%e, path = %path.display(), "Failed to open {what}, continuing without it");
            return None;
        }
    };
    match parse(BufReader::new(file)) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(%e, path = %path.display(), "Failed to parse {what}, continuing without it");
            None
        }
    }
}
