//! PCA-compressed corpus.
//!
//! Each background has its own basis. The relation
//! `embedding = eigenvectors · (flatten(grid) − mean)` must hold for both the
//! stored corpus embeddings and query projections, otherwise matches degrade
//! silently; [`EmbeddingCorpus::from_corpus`] and [`project`] share the same
//! code path for that reason.

use std::collections::HashMap;
use std::io::Read;

use super::corpus::{BackgroundId, Corpus, EntryMeta};
use super::feature_grid::CHANNELS;
use super::schema::EmbeddingFile;
use crate::api::{ConfigurationError, MosaicError};

/// Principal component basis for one background.
#[derive(Debug, Clone, PartialEq)]
pub struct PcaBasis {
    /// Mean flattened grid, length `N²·5`
    pub mean: Vec<f32>,
    /// Basis vectors in decreasing variance order, each of length `N²·5`
    pub eigenvectors: Vec<Vec<f32>>,
}

impl PcaBasis {
    /// Length of the flattened grids this basis projects.
    #[inline]
    pub fn input_len(&self) -> usize {
        self.mean.len()
    }

    /// Number of retained components.
    #[inline]
    pub fn dim(&self) -> usize {
        self.eigenvectors.len()
    }

    fn validate(&self, input_len: usize, dim: usize) -> Result<(), ConfigurationError> {
        if self.mean.len() != input_len {
            return Err(ConfigurationError::GridSizeMismatch {
                expected: input_len / CHANNELS,
                actual: self.mean.len() / CHANNELS,
            });
        }
        if self.eigenvectors.len() != dim {
            return Err(ConfigurationError::EmbeddingDimMismatch {
                expected: dim,
                actual: self.eigenvectors.len(),
            });
        }
        if let Some(bad) = self.eigenvectors.iter().find(|ev| ev.len() != input_len) {
            return Err(ConfigurationError::InvalidCorpus(format!(
                "eigenvector has {} components, expected {input_len}",
                bad.len()
            )));
        }
        Ok(())
    }
}

/// Project a flattened grid onto `basis`.
///
/// Returns `eigenvectors · (flat − mean)`, one value per retained component.
/// `flat` must have the basis input length; extra trailing values are
/// ignored.
///
/// # Example
///
/// ```
/// use emoji_mosaic::{project, PcaBasis};
///
/// let basis = PcaBasis {
///     mean: vec![0.5, 0.5],
///     eigenvectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
/// };
/// assert_eq!(project(&[1.0, 0.0], &basis), vec![0.5, -0.5]);
/// ```
pub fn project(flat: &[f32], basis: &PcaBasis) -> Vec<f32> {
    basis
        .eigenvectors
        .iter()
        .map(|ev| {
            flat.iter()
                .zip(&basis.mean)
                .zip(ev)
                .map(|((v, m), e)| (v - m) * e)
                .sum()
        })
        .collect()
}

/// Compressed corpus: one embedding per entry per background plus the
/// basis needed to embed queries.
#[derive(Debug, Clone)]
pub struct EmbeddingCorpus {
    version: u32,
    grid_size: usize,
    dim: usize,
    backgrounds: Vec<String>,
    characters: Vec<String>,
    meta: Vec<EntryMeta>,
    bases: Vec<PcaBasis>,
    // [background][entry * dim ..]
    embeddings: Vec<Vec<f32>>,
    index: HashMap<String, usize>,
}

impl EmbeddingCorpus {
    /// Parse an embedding corpus from its JSON artifact.
    ///
    /// # Errors
    ///
    /// [`MosaicError::Parse`] for malformed JSON; a
    /// [`ConfigurationError`] when a basis or embedding has the wrong
    /// length, or a declared background has no basis.
    pub fn from_json(bytes: &[u8]) -> Result<Self, MosaicError> {
        let file: EmbeddingFile = serde_json::from_slice(bytes)?;
        Self::from_file(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MosaicError> {
        let file: EmbeddingFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    fn from_file(mut file: EmbeddingFile) -> Result<Self, MosaicError> {
        if file.emojis.is_empty() {
            return Err(ConfigurationError::EmptyCorpus.into());
        }
        let input_len = file.grid_size * file.grid_size * CHANNELS;
        let dim = file.embedding_dim;

        let mut bases = Vec::with_capacity(file.backgrounds.len());
        for background in &file.backgrounds {
            let basis = file.pca.remove(background).map(|b| PcaBasis {
                mean: b.mean,
                eigenvectors: b.eigenvectors,
            });
            let basis = basis.ok_or_else(|| {
                ConfigurationError::InvalidCorpus(format!("no PCA basis for background '{background}'"))
            })?;
            basis.validate(input_len, dim)?;
            bases.push(basis);
        }

        let mut embeddings: Vec<Vec<f32>> = file
            .backgrounds
            .iter()
            .map(|_| Vec::with_capacity(file.emojis.len() * dim))
            .collect();
        let mut characters = Vec::with_capacity(file.emojis.len());
        let mut meta = Vec::with_capacity(file.emojis.len());
        let mut index = HashMap::with_capacity(file.emojis.len());

        for (i, record) in file.emojis.into_iter().enumerate() {
            for (b, background) in file.backgrounds.iter().enumerate() {
                let vector = record.e.get(background).ok_or_else(|| {
                    ConfigurationError::InvalidCorpus(format!(
                        "entry {i} ({}) has no embedding for background '{background}'",
                        record.c
                    ))
                })?;
                if vector.len() != dim {
                    return Err(ConfigurationError::EmbeddingDimMismatch {
                        expected: dim,
                        actual: vector.len(),
                    }
                    .into());
                }
                embeddings[b].extend_from_slice(vector);
            }
            index.entry(record.c.clone()).or_insert(i);
            meta.push(record.m.as_ref().map(EntryMeta::from).unwrap_or_default());
            characters.push(record.c);
        }

        tracing::debug!(
            version = file.version,
            entries = characters.len(),
            dim,
            backgrounds = file.backgrounds.len(),
            "Parsed embedding corpus"
        );

        Ok(Self {
            version: file.version,
            grid_size: file.grid_size,
            dim,
            backgrounds: file.backgrounds,
            characters,
            meta,
            bases,
            embeddings,
            index,
        })
    }

    /// Embed every entry of `corpus` with the given per-background bases.
    ///
    /// Backgrounds without a basis are left out of the compressed corpus.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] if the bases disagree on dimension or do not
    /// fit the corpus grid size, or if no basis names a corpus background.
    pub fn from_corpus(
        corpus: &Corpus,
        bases: Vec<(String, PcaBasis)>,
    ) -> Result<Self, ConfigurationError> {
        let input_len = corpus.cell_count() * CHANNELS;
        let dim = bases.first().map(|(_, b)| b.dim()).unwrap_or(0);

        let mut backgrounds = Vec::new();
        let mut kept_bases = Vec::new();
        let mut embeddings = Vec::new();
        for (name, basis) in bases {
            let Ok(id) = corpus.background_id(&name) else {
                continue;
            };
            basis.validate(input_len, dim)?;
            let mut packed = Vec::with_capacity(corpus.len() * dim);
            for flat in corpus.flat_grids(id) {
                packed.extend(project(flat, &basis));
            }
            backgrounds.push(name);
            kept_bases.push(basis);
            embeddings.push(packed);
        }
        if backgrounds.is_empty() {
            return Err(ConfigurationError::InvalidCorpus(
                "no basis matches a corpus background".into(),
            ));
        }

        let characters = corpus.characters().to_vec();
        let index = characters
            .iter()
            .enumerate()
            .rev()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        Ok(Self {
            version: corpus.version(),
            grid_size: corpus.grid_size(),
            dim,
            backgrounds,
            meta: (0..corpus.len()).map(|i| *corpus.meta(i)).collect(),
            characters,
            bases: kept_bases,
            embeddings,
            index,
        })
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Embedding length.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn backgrounds(&self) -> &[String] {
        &self.backgrounds
    }

    /// Resolve a background name against this compressed corpus.
    ///
    /// Ids are only meaningful for the corpus that issued them.
    pub fn background_id(&self, name: &str) -> Result<BackgroundId, ConfigurationError> {
        self.backgrounds
            .iter()
            .position(|b| b == name)
            .map(BackgroundId::from_index)
            .ok_or_else(|| ConfigurationError::UnknownBackground(name.to_string()))
    }

    #[inline]
    pub fn character(&self, index: usize) -> &str {
        &self.characters[index]
    }

    #[inline]
    pub fn meta(&self, index: usize) -> &EntryMeta {
        &self.meta[index]
    }

    #[inline]
    pub fn index_of(&self, character: &str) -> Option<usize> {
        self.index.get(character).copied()
    }

    pub fn basis(&self, background: BackgroundId) -> &PcaBasis {
        &self.bases[background.index()]
    }

    /// Stored embedding of entry `index` on `background`.
    #[inline]
    pub fn embedding(&self, background: BackgroundId, index: usize) -> &[f32] {
        &self.embeddings[background.index()][index * self.dim..(index + 1) * self.dim]
    }

    pub fn embeddings(&self, background: BackgroundId) -> impl Iterator<Item = &[f32]> {
        self.embeddings[background.index()].chunks_exact(self.dim.max(1))
    }
}
