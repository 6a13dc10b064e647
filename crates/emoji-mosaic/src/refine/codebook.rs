//! Quad codebook: archetypal 16×16 patterns with their best emoji quads.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::api::{ConfigurationError, MosaicError};
use crate::color::Rgb;
use crate::corpus::schema::{CodebookFile, PatternRecord};

/// Side length of every reference pattern.
pub const PATTERN_SIZE: usize = 16;

/// Archetype a pattern was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternCategory {
    Solid,
    Gradient,
    Edge,
    Corner,
}

impl FromStr for PatternCategory {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "gradient" => Ok(Self::Gradient),
            "edge" => Ok(Self::Edge),
            "corner" => Ok(Self::Corner),
            other => Err(ConfigurationError::InvalidCorpus(format!(
                "unknown pattern type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
            Self::Edge => "edge",
            Self::Corner => "corner",
        })
    }
}

/// Four glyphs in reading order: top-left, top-right, bottom-left,
/// bottom-right.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub chars: [String; 4],
    /// Distance to the reference pattern computed when the codebook was built
    pub dist: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodebookPattern {
    pub name: String,
    pub category: PatternCategory,
    /// `PATTERN_SIZE²` colours, row-major
    pub pattern: Vec<Rgb>,
    /// Candidate quads, best first
    pub quads: Vec<Quad>,
}

impl CodebookPattern {
    /// Summed squared RGB distance to a reference block.
    pub fn distance(&self, reference: &[Rgb]) -> f32 {
        self.pattern
            .iter()
            .zip(reference)
            .map(|(p, r)| p.distance_sq(*r))
            .sum()
    }

    fn from_record(record: PatternRecord) -> Result<Self, ConfigurationError> {
        if record.pattern.len() != PATTERN_SIZE * PATTERN_SIZE {
            return Err(ConfigurationError::InvalidCorpus(format!(
                "pattern '{}' has {} samples, expected {}",
                record.name,
                record.pattern.len(),
                PATTERN_SIZE * PATTERN_SIZE
            )));
        }
        // Stored as 0..=255 values
        let pattern = record
            .pattern
            .iter()
            .map(|[r, g, b]| Rgb::new(r / 255.0, g / 255.0, b / 255.0))
            .collect();
        let quads = record
            .quads
            .into_iter()
            .map(|q| Quad {
                chars: q.chars,
                dist: q.dist,
            })
            .collect();
        Ok(Self {
            category: record.kind.parse()?,
            name: record.name,
            pattern,
            quads,
        })
    }
}

/// Read-only pattern codebook for one background.
#[derive(Debug, Clone)]
pub struct QuadCodebook {
    version: u32,
    background: String,
    patterns: Vec<CodebookPattern>,
}

impl QuadCodebook {
    /// Build a codebook from already-normalised patterns.
    pub fn new(background: impl Into<String>, patterns: Vec<CodebookPattern>) -> Self {
        Self {
            version: 1,
            background: background.into(),
            patterns,
        }
    }

    /// Parse a codebook from its JSON artifact.
    ///
    /// # Errors
    ///
    /// [`MosaicError::Parse`] for malformed JSON;
    /// [`ConfigurationError::InvalidCorpus`] for a pattern of the wrong size
    /// or an unknown pattern type.
    pub fn from_json(bytes: &[u8]) -> Result<Self, MosaicError> {
        let file: CodebookFile = serde_json::from_slice(bytes)?;
        Self::from_file(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MosaicError> {
        let file: CodebookFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    fn from_file(file: CodebookFile) -> Result<Self, MosaicError> {
        if file.grid_size != 0 && file.grid_size != PATTERN_SIZE {
            return Err(ConfigurationError::GridSizeMismatch {
                expected: PATTERN_SIZE * PATTERN_SIZE,
                actual: file.grid_size * file.grid_size,
            }
            .into());
        }
        let patterns = file
            .patterns
            .into_iter()
            .map(CodebookPattern::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            patterns = patterns.len(),
            background = %file.background,
            "Loaded quad codebook"
        );
        Ok(Self {
            version: file.version,
            background: file.background,
            patterns,
        })
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Background the quads were scored against.
    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn patterns(&self) -> &[CodebookPattern] {
        &self.patterns
    }

    /// Pattern closest to `reference`; the first one wins ties.
    pub fn nearest_pattern(&self, reference: &[Rgb]) -> Option<&CodebookPattern> {
        let mut best: Option<(&CodebookPattern, f32)> = None;
        for pattern in &self.patterns {
            let dist = pattern.distance(reference);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((pattern, dist));
            }
        }
        best.map(|(p, _)| p)
    }
}
