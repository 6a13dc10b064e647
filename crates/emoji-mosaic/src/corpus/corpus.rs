//! The feature corpus with background names resolved to integer ids.

use std::collections::HashMap;
use std::io::Read;

use super::feature_grid::{Cell, FeatureGrid, CHANNELS};
use super::schema::{CorpusFile, EntryRecord, MetaRecord};
use crate::api::{ConfigurationError, MosaicError};
use crate::color::Rgb;

/// Background resolved against a specific corpus.
///
/// Obtained from [`Corpus::background_id`]; indexes the contiguous
/// per-background arrays so the hot matching loop never hashes a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackgroundId(u16);

impl BackgroundId {
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u16)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Scalar metadata shipped with each corpus entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntryMeta {
    pub avg_alpha: f32,
    pub avg_luminance: f32,
    pub avg_color: Rgb,
}

impl EntryMeta {
    /// Derive metadata from a rendered grid.
    pub fn from_grid(grid: &FeatureGrid) -> Self {
        Self {
            avg_alpha: grid.average_alpha(),
            avg_luminance: grid.average_luminance(),
            avg_color: grid.average_color(),
        }
    }
}

impl From<&MetaRecord> for EntryMeta {
    fn from(m: &MetaRecord) -> Self {
        Self {
            avg_alpha: m.avg_alpha,
            avg_luminance: m.avg_luminance,
            avg_color: Rgb::new(m.avg_color[0], m.avg_color[1], m.avg_color[2]),
        }
    }
}

/// Per-background summary of a glyph grid, precomputed at load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphStats {
    /// Mean cell colour
    pub average: Rgb,
    /// Mean cell luminance
    pub luminance: f32,
    /// Luminance variance around the mean
    pub variance: f32,
}

impl GlyphStats {
    fn of(grid: &FeatureGrid) -> Self {
        Self {
            average: grid.average_color(),
            luminance: grid.average_luminance(),
            variance: grid.luminance_variance(),
        }
    }
}

/// One glyph before it is packed into a [`Corpus`].
///
/// # Example
///
/// ```
/// use emoji_mosaic::{Cell, CorpusEntry, FeatureGrid};
///
/// let entry = CorpusEntry::new("⚪")
///     .with_grid("white", FeatureGrid::uniform(4, Cell::new(1.0, 1.0, 1.0, 1.0)));
/// assert_eq!(entry.character, "⚪");
/// ```
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    /// The glyph, one or more Unicode scalar values
    pub character: String,
    /// Explicit metadata; derived from the grids when `None`
    pub meta: Option<EntryMeta>,
    /// Grid per background name
    pub grids: HashMap<String, FeatureGrid>,
}

impl CorpusEntry {
    pub fn new(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            meta: None,
            grids: HashMap::new(),
        }
    }

    pub fn with_grid(mut self, background: impl Into<String>, grid: FeatureGrid) -> Self {
        self.grids.insert(background.into(), grid);
        self
    }

    pub fn with_meta(mut self, meta: EntryMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Immutable feature corpus.
///
/// Every entry carries one grid per background. At construction the grids
/// are flattened into one contiguous `f32` array per background, and
/// per-glyph statistics are computed once so neither the matchers nor the
/// diffuser recompute them per query.
#[derive(Debug, Clone)]
pub struct Corpus {
    version: u32,
    grid_size: usize,
    backgrounds: Vec<String>,
    characters: Vec<String>,
    meta: Vec<EntryMeta>,
    // [background][entry * cell_count * CHANNELS ..]
    grids: Vec<Vec<f32>>,
    stats: Vec<Vec<GlyphStats>>,
    index: HashMap<String, usize>,
}

impl Corpus {
    /// Pack entries into a corpus.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::EmptyCorpus`] if `entries` is empty
    /// - [`ConfigurationError::InvalidCorpus`] if `backgrounds` is empty or
    ///   an entry lacks a grid for one of them
    /// - [`ConfigurationError::GridSizeMismatch`] if a grid is not
    ///   `grid_size`×`grid_size`
    pub fn from_entries(
        grid_size: usize,
        backgrounds: Vec<String>,
        entries: Vec<CorpusEntry>,
    ) -> Result<Self, ConfigurationError> {
        if entries.is_empty() {
            return Err(ConfigurationError::EmptyCorpus);
        }
        if grid_size == 0 {
            return Err(ConfigurationError::InvalidCorpus(
                "grid size must be positive".into(),
            ));
        }
        if backgrounds.is_empty() || backgrounds.len() > u16::MAX as usize {
            return Err(ConfigurationError::InvalidCorpus(format!(
                "corpus must declare between 1 and {} backgrounds, found {}",
                u16::MAX,
                backgrounds.len()
            )));
        }

        let cell_count = grid_size * grid_size;
        let mut grids: Vec<Vec<f32>> = backgrounds
            .iter()
            .map(|_| Vec::with_capacity(entries.len() * cell_count * CHANNELS))
            .collect();
        let mut stats: Vec<Vec<GlyphStats>> = backgrounds
            .iter()
            .map(|_| Vec::with_capacity(entries.len()))
            .collect();
        let mut characters = Vec::with_capacity(entries.len());
        let mut meta = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.into_iter().enumerate() {
            for (b, background) in backgrounds.iter().enumerate() {
                let grid = entry.grids.get(background).ok_or_else(|| {
                    ConfigurationError::InvalidCorpus(format!(
                        "entry {i} ({}) has no grid for background '{background}'",
                        entry.character
                    ))
                })?;
                if grid.cell_count() != cell_count {
                    return Err(ConfigurationError::GridSizeMismatch {
                        expected: cell_count,
                        actual: grid.cell_count(),
                    });
                }
                grids[b].extend(grid.flatten());
                stats[b].push(GlyphStats::of(grid));
            }

            let entry_meta = entry.meta.unwrap_or_else(|| {
                // Metadata describes the glyph on white when that rendering exists
                let reference = entry
                    .grids
                    .get("white")
                    .or_else(|| entry.grids.get(&backgrounds[0]));
                reference.map(EntryMeta::from_grid).unwrap_or_default()
            });

            index.entry(entry.character.clone()).or_insert(i);
            characters.push(entry.character);
            meta.push(entry_meta);
        }

        Ok(Self {
            version: 1,
            grid_size,
            backgrounds,
            characters,
            meta,
            grids,
            stats,
            index,
        })
    }

    /// Parse a feature corpus from its JSON artifact.
    ///
    /// # Errors
    ///
    /// [`MosaicError::Parse`] for malformed JSON, otherwise the errors of
    /// [`from_entries`](Self::from_entries).
    pub fn from_json(bytes: &[u8]) -> Result<Self, MosaicError> {
        let file: CorpusFile = serde_json::from_slice(bytes)?;
        Self::from_file(file)
    }

    /// Parse a feature corpus from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MosaicError> {
        let file: CorpusFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    fn from_file(file: CorpusFile) -> Result<Self, MosaicError> {
        let grid_size = file.grid_size;
        let version = file.version;
        let entries = file
            .emojis
            .into_iter()
            .map(|record| entry_from_record(record, grid_size))
            .collect::<Result<Vec<_>, _>>()?;

        let mut corpus = Self::from_entries(grid_size, file.backgrounds, entries)?;
        corpus.version = version;

        tracing::debug!(
            version,
            entries = corpus.len(),
            grid_size,
            backgrounds = corpus.backgrounds.len(),
            "Parsed feature corpus"
        );
        Ok(corpus)
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Side length N of every grid.
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// N², the number of cells a source grid must have.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
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

    /// Resolve a background name.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownBackground`] if the corpus has no grids
    /// for `name`.
    pub fn background_id(&self, name: &str) -> Result<BackgroundId, ConfigurationError> {
        self.backgrounds
            .iter()
            .position(|b| b == name)
            .map(BackgroundId::from_index)
            .ok_or_else(|| ConfigurationError::UnknownBackground(name.to_string()))
    }

    pub fn background_name(&self, id: BackgroundId) -> &str {
        &self.backgrounds[id.index()]
    }

    #[inline]
    pub fn character(&self, index: usize) -> &str {
        &self.characters[index]
    }

    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    #[inline]
    pub fn meta(&self, index: usize) -> &EntryMeta {
        &self.meta[index]
    }

    /// Corpus index of a glyph, `None` for glyphs from another corpus.
    #[inline]
    pub fn index_of(&self, character: &str) -> Option<usize> {
        self.index.get(character).copied()
    }

    /// Flattened `[r, g, b, l, a]` grid of entry `index` on `background`.
    #[inline]
    pub fn flat_grid(&self, background: BackgroundId, index: usize) -> &[f32] {
        let stride = self.cell_count() * CHANNELS;
        &self.grids[background.index()][index * stride..(index + 1) * stride]
    }

    /// Every entry's flattened grid on `background`, in corpus order.
    pub fn flat_grids(&self, background: BackgroundId) -> impl Iterator<Item = &[f32]> {
        self.grids[background.index()].chunks_exact(self.cell_count() * CHANNELS)
    }

    pub fn grid(&self, background: BackgroundId, index: usize) -> FeatureGrid {
        FeatureGrid::from_flat(self.grid_size, self.flat_grid(background, index))
    }

    #[inline]
    pub fn stats(&self, background: BackgroundId, index: usize) -> &GlyphStats {
        &self.stats[background.index()][index]
    }

    pub fn all_stats(&self, background: BackgroundId) -> &[GlyphStats] {
        &self.stats[background.index()]
    }
}

fn entry_from_record(record: EntryRecord, grid_size: usize) -> Result<CorpusEntry, MosaicError> {
    let mut entry = CorpusEntry::new(record.c);
    entry.meta = record.m.as_ref().map(EntryMeta::from);
    for (background, cells) in record.g {
        let cells = cells
            .into_iter()
            .map(|c| Cell::new(c.r, c.g, c.b, c.a))
            .collect();
        let grid = FeatureGrid::new(grid_size, cells)?;
        entry.grids.insert(background, grid);
    }
    Ok(entry)
}
