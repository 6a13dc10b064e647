//! Matching options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which channels the structural distance compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// RGB, saturation and coverage
    #[default]
    Color,
    /// Luminance and coverage only
    Grayscale,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(Self::Color),
            "grayscale" | "greyscale" | "gray" => Ok(Self::Grayscale),
            other => Err(format!("unknown match mode '{other}'")),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Color => "color",
            Self::Grayscale => "grayscale",
        })
    }
}

/// Per-query matching options.
///
/// # Defaults
///
/// - mode: [`MatchMode::Color`]
/// - diversity: 1 (always the single best match)
/// - avoid_recent: 0 (no recent-use penalty)
/// - recent_penalty: 3.0
///
/// # Example
///
/// ```
/// use emoji_mosaic::{MatchMode, MatchOptions};
///
/// let options = MatchOptions::new()
///     .mode(MatchMode::Grayscale)
///     .diversity(4)
///     .avoid_recent(6);
/// assert_eq!(options.diversity, 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub mode: MatchMode,

    /// Sample among the `diversity` closest entries instead of always taking
    /// the closest. Values of 0 and 1 both mean best-only.
    pub diversity: usize,

    /// During a whole-image conversion, how many of the most recently chosen
    /// entries are penalised.
    pub avoid_recent: usize,

    /// Distance multiplier for recently used entries.
    pub recent_penalty: f32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::Color,
            diversity: 1,
            avoid_recent: 0,
            recent_penalty: 3.0,
        }
    }
}

impl MatchOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn diversity(mut self, k: usize) -> Self {
        self.diversity = k;
        self
    }

    #[inline]
    pub fn avoid_recent(mut self, count: usize) -> Self {
        self.avoid_recent = count;
        self
    }

    #[inline]
    pub fn recent_penalty(mut self, factor: f32) -> Self {
        self.recent_penalty = factor;
        self
    }
}
