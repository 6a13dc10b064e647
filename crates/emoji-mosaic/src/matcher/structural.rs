//! Exact structural matcher over full feature grids.

use rand::Rng;

use super::options::{MatchMode, MatchOptions};
use super::ranking;
use super::recent::RecentlyUsed;
use super::{EmojiMatch, MatchResult};
use crate::api::ConfigurationError;
use crate::color::saturation;
use crate::corpus::{BackgroundId, Corpus, FeatureGrid, CHANNELS};

/// Weight of the HSV saturation mismatch relative to RGB distance.
pub const SATURATION_WEIGHT: f32 = 1.5;

/// Weight of the coverage mismatch.
pub const ALPHA_WEIGHT: f32 = 0.3;

/// Colour-mode distance between two flattened grids of equal length.
///
/// Per cell: `(rgb² + 1.5·sat² + 0.3·alpha²) · (0.5 + 0.5·sourceAlpha)`,
/// summed over cells.
pub fn color_distance(source: &[f32], candidate: &[f32]) -> f32 {
    source
        .chunks_exact(CHANNELS)
        .zip(candidate.chunks_exact(CHANNELS))
        .map(|(s, e)| {
            let (sr, sg, sb, sa) = (s[0], s[1], s[2], s[4]);
            let (er, eg, eb, ea) = (e[0], e[1], e[2], e[4]);

            let color = (sr - er).powi(2) + (sg - eg).powi(2) + (sb - eb).powi(2);
            let sat = (saturation(sr, sg, sb) - saturation(er, eg, eb)).powi(2);
            let alpha = (sa - ea).powi(2);

            (color + SATURATION_WEIGHT * sat + ALPHA_WEIGHT * alpha) * (0.5 + 0.5 * sa)
        })
        .sum()
}

/// Grayscale-mode distance: luminance and coverage only.
pub fn grayscale_distance(source: &[f32], candidate: &[f32]) -> f32 {
    source
        .chunks_exact(CHANNELS)
        .zip(candidate.chunks_exact(CHANNELS))
        .map(|(s, e)| {
            let (sl, sa) = (s[3], s[4]);
            let (el, ea) = (e[3], e[4]);
            ((sl - el).powi(2) + ALPHA_WEIGHT * (sa - ea).powi(2)) * (0.5 + 0.5 * sa)
        })
        .sum()
}

/// Matches source grids against every corpus grid on one background.
///
/// # Example
///
/// ```
/// use emoji_mosaic::{Cell, Corpus, CorpusEntry, EmojiMatch, FeatureGrid, MatchOptions,
///     StructuralMatcher};
/// use rand::SeedableRng;
///
/// let white = FeatureGrid::uniform(2, Cell::new(1.0, 1.0, 1.0, 1.0));
/// let black = FeatureGrid::uniform(2, Cell::new(0.0, 0.0, 0.0, 1.0));
/// let corpus = Corpus::from_entries(
///     2,
///     vec!["white".into()],
///     vec![
///         CorpusEntry::new("⬜").with_grid("white", white.clone()),
///         CorpusEntry::new("⬛").with_grid("white", black),
///     ],
/// )
/// .unwrap();
///
/// let matcher = StructuralMatcher::new(&corpus);
/// let bg = matcher.background_id("white").unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let result = matcher
///     .find_match(&white, bg, &MatchOptions::new(), None, &mut rng)
///     .unwrap();
/// assert_eq!(result.character, "⬜");
/// assert_eq!(result.distance, 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StructuralMatcher<'a> {
    corpus: &'a Corpus,
}

impl<'a> StructuralMatcher<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &'a Corpus {
        self.corpus
    }

    fn check_grid(&self, grid: &FeatureGrid) -> Result<(), ConfigurationError> {
        if grid.cell_count() != self.corpus.cell_count() {
            return Err(ConfigurationError::GridSizeMismatch {
                expected: self.corpus.cell_count(),
                actual: grid.cell_count(),
            });
        }
        Ok(())
    }

    /// Unpenalised distance from `grid` to every corpus entry, in corpus
    /// order.
    pub fn distances(
        &self,
        grid: &FeatureGrid,
        background: BackgroundId,
        mode: MatchMode,
    ) -> Result<Vec<(usize, f32)>, ConfigurationError> {
        self.check_grid(grid)?;
        let source = grid.flatten();
        let metric = match mode {
            MatchMode::Color => color_distance,
            MatchMode::Grayscale => grayscale_distance,
        };
        Ok(self
            .corpus
            .flat_grids(background)
            .map(|candidate| metric(&source, candidate))
            .enumerate()
            .collect())
    }

    /// Every corpus entry ranked by distance, closest first.
    pub fn ranked(
        &self,
        grid: &FeatureGrid,
        background: BackgroundId,
        mode: MatchMode,
    ) -> Result<Vec<(usize, f32)>, ConfigurationError> {
        let distances = self.distances(grid, background, mode)?;
        Ok(ranking::rank(distances, None, 1.0))
    }
}

impl EmojiMatch for StructuralMatcher<'_> {
    fn grid_size(&self) -> usize {
        self.corpus.grid_size()
    }

    fn background_id(&self, name: &str) -> Result<BackgroundId, ConfigurationError> {
        self.corpus.background_id(name)
    }

    fn find_match<R: Rng + ?Sized>(
        &self,
        grid: &FeatureGrid,
        background: BackgroundId,
        options: &MatchOptions,
        recent: Option<&RecentlyUsed>,
        rng: &mut R,
    ) -> Result<MatchResult, ConfigurationError> {
        let distances = self.distances(grid, background, options.mode)?;
        let (index, distance) = ranking::select(distances, recent, options, rng)
            .ok_or(ConfigurationError::EmptyCorpus)?;
        Ok(MatchResult {
            character: self.corpus.character(index).to_string(),
            distance,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Cell, CorpusEntry};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn solid(v: (f32, f32, f32), a: f32) -> FeatureGrid {
        FeatureGrid::uniform(2, Cell::new(v.0, v.1, v.2, a))
    }

    fn corpus() -> Corpus {
        Corpus::from_entries(
            2,
            vec!["white".into()],
            vec![
                CorpusEntry::new("⬜").with_grid("white", solid((1.0, 1.0, 1.0), 1.0)),
                CorpusEntry::new("🟥").with_grid("white", solid((0.9, 0.1, 0.1), 1.0)),
                CorpusEntry::new("🩶").with_grid("white", solid((0.6, 0.6, 0.6), 1.0)),
                CorpusEntry::new("⬛").with_grid("white", solid((0.0, 0.0, 0.0), 1.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_color_distance_zero_for_identical() {
        let flat = solid((0.3, 0.5, 0.7), 0.6).flatten();
        assert_eq!(color_distance(&flat, &flat), 0.0);
    }

    #[test]
    fn test_saturation_term_prefers_muted_for_muted_source() {
        // Equal RGB distance from a grey source, only saturation differs
        let source = solid((0.5, 0.5, 0.5), 1.0).flatten();
        let desaturated = solid((0.6, 0.6, 0.6), 1.0).flatten();
        let saturated = solid((0.6, 0.4, 0.4), 1.0).flatten();
        assert!(color_distance(&source, &desaturated) < color_distance(&source, &saturated));
    }

    #[test]
    fn test_transparent_source_cells_weigh_half() {
        let source = solid((1.0, 1.0, 1.0), 0.0).flatten();
        let candidate = solid((0.0, 0.0, 0.0), 0.0).flatten();
        // Four cells, colour term 3.0 each, halved by the zero source alpha
        assert!((color_distance(&source, &candidate) - 0.5 * 3.0 * 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_grayscale_distance_ignores_hue() {
        let a = FeatureGrid::uniform(2, Cell::new(1.0, 0.0, 0.0, 1.0));
        let b = FeatureGrid::uniform(2, Cell::new(0.299, 0.299, 0.299, 1.0));
        assert!(grayscale_distance(&a.flatten(), &b.flatten()) < 1e-9);
        assert!(color_distance(&a.flatten(), &b.flatten()) > 0.1);
    }

    #[test]
    fn test_self_match_is_exact() {
        let corpus = corpus();
        let matcher = StructuralMatcher::new(&corpus);
        let bg = matcher.background_id("white").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        for i in 0..corpus.len() {
            let result = matcher
                .find_match(&corpus.grid(bg, i), bg, &MatchOptions::new(), None, &mut rng)
                .unwrap();
            assert_eq!(result.index, i);
            assert_eq!(result.distance, 0.0);
        }
    }

    #[test]
    fn test_recent_penalty_forces_variety() {
        let corpus = corpus();
        let matcher = StructuralMatcher::new(&corpus);
        let bg = matcher.background_id("white").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let query = solid((0.82, 0.82, 0.82), 1.0);

        let mut recent = RecentlyUsed::new(1);
        let first = matcher
            .find_match(&query, bg, &MatchOptions::new(), Some(&recent), &mut rng)
            .unwrap();
        assert_eq!(first.character, "⬜");

        recent.push(first.index);
        let second = matcher
            .find_match(&query, bg, &MatchOptions::new(), Some(&recent), &mut rng)
            .unwrap();
        assert_ne!(second.character, "⬜");
    }

    #[test]
    fn test_grid_size_mismatch() {
        let corpus = corpus();
        let matcher = StructuralMatcher::new(&corpus);
        let bg = matcher.background_id("white").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let wrong = FeatureGrid::uniform(4, Cell::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(
            matcher
                .find_match(&wrong, bg, &MatchOptions::new(), None, &mut rng)
                .unwrap_err(),
            ConfigurationError::GridSizeMismatch {
                expected: 4,
                actual: 16
            }
        );
    }

    #[test]
    fn test_diversity_samples_from_candidate_set() {
        let corpus = corpus();
        let matcher = StructuralMatcher::new(&corpus);
        let bg = matcher.background_id("white").unwrap();
        let query = solid((0.8, 0.8, 0.8), 1.0);
        let top2: Vec<usize> = matcher
            .ranked(&query, bg, MatchMode::Color)
            .unwrap()
            .iter()
            .take(2)
            .map(|c| c.0)
            .collect();

        let mut rng = StdRng::seed_from_u64(42);
        let options = MatchOptions::new().diversity(2);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let result = matcher
                .find_match(&query, bg, &options, None, &mut rng)
                .unwrap();
            assert!(top2.contains(&result.index));
            seen.insert(result.index);
        }
        assert_eq!(seen.len(), 2, "both near-best entries should be drawn");
    }
}
