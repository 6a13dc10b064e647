//! Multi-channel annealing diffuser.
//!
//! Each iteration is a forward pass in row-major order followed by a
//! backward pass in reverse order. Every cell is re-scored against four
//! weighted channels (colour, texture, pattern, contrast) over a candidate
//! set, with simulated-annealing acceptance. Only the forward pass diffuses
//! the residual colour error of changed cells; the backward pass is a
//! cleanup sweep over the same targets. The schedule always runs to
//! completion and the temperature is multiplied by the cooling rate after
//! each cycle.

use rand::Rng;

use super::features::{SourceCell, SourceFeatures, TextureClass};
use super::options::DiffuserOptions;
use crate::api::ConfigurationError;
use crate::color::Rgb;
use crate::corpus::{BackgroundId, Corpus};
use crate::output::Mosaic;
use crate::sample::{MosaicLayout, SourceImage};

const SOLID_SOURCE_PENALTY: f32 = 0.5;
const EDGE_SOURCE_PENALTY: f32 = 0.3;
const TEXTURED_GLYPH_VARIANCE: f32 = 0.05;
const FLAT_GLYPH_VARIANCE: f32 = 0.02;
const REPEAT_PENALTY: f32 = 0.3;

const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Glyphs around a cell and the corpus luminance of the known ones.
#[derive(Debug, Default)]
struct Neighborhood<'m> {
    glyphs: Vec<&'m str>,
    luminances: Vec<f32>,
}

/// Result of re-scoring one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellUpdate {
    /// Accepted corpus index
    pub index: usize,
    /// Whether the accepted glyph differs from the cell's glyph
    pub changed: bool,
    /// `target − acceptedAverageColour`
    pub error: Rgb,
}

/// Progress after one forward+backward cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    pub score: f32,
    pub changes: usize,
    /// Temperature the cycle ran at
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffuseOutcome {
    pub mosaic: Mosaic,
    pub initial_score: f32,
    pub final_score: f32,
    pub iterations: Vec<IterationReport>,
}

impl DiffuseOutcome {
    /// Relative score improvement in percent; 0 when the input scored 0.
    pub fn improvement_percent(&self) -> f32 {
        if self.initial_score > 0.0 {
            (self.initial_score - self.final_score) / self.initial_score * 100.0
        } else {
            0.0
        }
    }
}

/// Annealing optimiser over a finished mosaic.
///
/// # Example
///
/// ```
/// use emoji_mosaic::{Cell, Corpus, CorpusEntry, DiffuserOptions, FeatureGrid, JaDiffuser,
///     Mosaic, MosaicLayout, Rgb, SourceImage};
/// use rand::SeedableRng;
///
/// let solid = |v: f32| FeatureGrid::uniform(2, Cell::new(v, v, v, 1.0));
/// let corpus = Corpus::from_entries(
///     2,
///     vec!["white".into()],
///     vec![
///         CorpusEntry::new("⬜").with_grid("white", solid(1.0)),
///         CorpusEntry::new("⬛").with_grid("white", solid(0.0)),
///     ],
/// )
/// .unwrap();
/// let bg = corpus.background_id("white").unwrap();
///
/// let image = SourceImage::solid(4, 4, Rgb::BLACK);
/// let layout = MosaicLayout::for_image(&image, 2, 1.0);
/// let diffuser = JaDiffuser::new(&corpus, bg, DiffuserOptions::new().initial_temperature(0.0));
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
///
/// let outcome = diffuser
///     .diffuse(&Mosaic::filled(2, 2, "⬜"), &image, &layout, Rgb::WHITE, &mut rng)
///     .unwrap();
/// assert_eq!(outcome.mosaic.to_string(), "⬛⬛\n⬛⬛");
/// assert!(outcome.final_score < outcome.initial_score);
/// ```
#[derive(Debug, Clone)]
pub struct JaDiffuser<'a> {
    corpus: &'a Corpus,
    background: BackgroundId,
    options: DiffuserOptions,
}

impl<'a> JaDiffuser<'a> {
    pub fn new(corpus: &'a Corpus, background: BackgroundId, options: DiffuserOptions) -> Self {
        Self {
            corpus,
            background,
            options,
        }
    }

    pub fn options(&self) -> &DiffuserOptions {
        &self.options
    }

    /// Refine `mosaic` against `image`, compositing source blocks over
    /// `backdrop`.
    ///
    /// Returns a new mosaic; the input is never modified.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidImage`] for an image without pixels;
    /// [`ConfigurationError::LayoutMismatch`] if the mosaic does not have
    /// the layout's dimensions.
    pub fn diffuse<R: Rng + ?Sized>(
        &self,
        mosaic: &Mosaic,
        image: &SourceImage,
        layout: &MosaicLayout,
        backdrop: Rgb,
        rng: &mut R,
    ) -> Result<DiffuseOutcome, ConfigurationError> {
        image.ensure_not_empty()?;
        if mosaic.cols() != layout.cols || mosaic.rows() != layout.rows {
            return Err(ConfigurationError::LayoutMismatch {
                cols: layout.cols,
                rows: layout.rows,
                actual_cols: mosaic.cols(),
                actual_rows: mosaic.rows(),
            });
        }
        let mut features = SourceFeatures::extract(image, layout, backdrop);
        self.optimize(mosaic, &mut features, rng)
    }

    /// Run the full schedule against precomputed source features.
    ///
    /// The error accumulators of `features` are updated in place.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::LayoutMismatch`] if `features` does not have
    /// the mosaic's dimensions.
    pub fn optimize<R: Rng + ?Sized>(
        &self,
        mosaic: &Mosaic,
        features: &mut SourceFeatures,
        rng: &mut R,
    ) -> Result<DiffuseOutcome, ConfigurationError> {
        let (cols, rows) = (mosaic.cols(), mosaic.rows());
        if (features.cols(), features.rows()) != (cols, rows) {
            return Err(ConfigurationError::LayoutMismatch {
                cols: features.cols(),
                rows: features.rows(),
                actual_cols: cols,
                actual_rows: rows,
            });
        }

        let stale = mosaic
            .cells()
            .iter()
            .filter(|g| self.corpus.index_of(g).is_none())
            .count();
        if stale > 0 {
            tracing::warn!(stale, "Cells with glyphs outside the corpus are left unchanged");
        }

        let mut current = mosaic.clone();
        let initial_score = self.score_grid(&current, features);
        tracing::debug!(score = initial_score, "Diffuser initial score");

        let kernel = self.options.kernel;
        let mut temperature = self.options.initial_temperature;
        let mut iterations = Vec::with_capacity(self.options.iterations);

        for iteration in 0..self.options.iterations {
            let mut changes = 0;

            for row in 0..rows {
                for col in 0..cols {
                    let update = self.optimize_cell(&current, features, col, row, temperature, rng);
                    if let Some(update) = update.filter(|u| u.changed) {
                        current.set(col, row, self.corpus.character(update.index));
                        features.diffuse_error(col, row, update.error, &kernel);
                        changes += 1;
                    }
                }
            }

            for row in (0..rows).rev() {
                for col in (0..cols).rev() {
                    let update = self.optimize_cell(&current, features, col, row, temperature, rng);
                    if let Some(update) = update.filter(|u| u.changed) {
                        current.set(col, row, self.corpus.character(update.index));
                        changes += 1;
                    }
                }
            }

            let score = self.score_grid(&current, features);
            tracing::debug!(
                iteration = iteration + 1,
                score,
                changes,
                temperature,
                "Diffuser iteration"
            );
            iterations.push(IterationReport {
                score,
                changes,
                temperature,
            });
            temperature *= self.options.cooling_rate;
        }

        let final_score = self.score_grid(&current, features);
        let outcome = DiffuseOutcome {
            mosaic: current,
            initial_score,
            final_score,
            iterations,
        };
        tracing::info!(
            initial = initial_score,
            final_score,
            improvement_pct = outcome.improvement_percent(),
            "Diffuser finished"
        );
        Ok(outcome)
    }

    /// Re-score the cell at `(col, row)`.
    ///
    /// Returns `None` when the cell's glyph is not in the corpus; such cells
    /// are left as they are.
    pub fn optimize_cell<R: Rng + ?Sized>(
        &self,
        mosaic: &Mosaic,
        features: &SourceFeatures,
        col: usize,
        row: usize,
        temperature: f32,
        rng: &mut R,
    ) -> Option<CellUpdate> {
        let current = mosaic.get(col, row);
        let current_index = self.corpus.index_of(current)?;

        let source = features.get(col, row);
        let target = source.target();
        let hood = self.neighborhood(mosaic, col, row);

        let mut best_index = current_index;
        let mut best_score = self.score_cell(current_index, target, source, &hood);

        for candidate in self.candidates(target, rng) {
            let score = self.score_cell(candidate, target, source, &hood);
            if score < best_score || accept_worse(best_score, score, temperature, rng) {
                best_score = score;
                best_index = candidate;
            }
        }

        let average = self.corpus.stats(self.background, best_index).average;
        Some(CellUpdate {
            index: best_index,
            changed: self.corpus.character(best_index) != current,
            error: target - average,
        })
    }

    /// Mean per-cell score of `mosaic` against the raw source colours.
    ///
    /// Cells with glyphs outside the corpus contribute nothing but still
    /// count towards the mean.
    pub fn score_grid(&self, mosaic: &Mosaic, features: &SourceFeatures) -> f32 {
        let cells = mosaic.cols() * mosaic.rows();
        if cells == 0 {
            return 0.0;
        }
        let mut total = 0.0;
        for row in 0..mosaic.rows() {
            for col in 0..mosaic.cols() {
                let Some(index) = self.corpus.index_of(mosaic.get(col, row)) else {
                    continue;
                };
                let source = features.get(col, row);
                let hood = self.neighborhood(mosaic, col, row);
                total += self.score_cell(index, source.color, source, &hood);
            }
        }
        total / cells as f32
    }

    fn score_cell(&self, index: usize, target: Rgb, source: &SourceCell, hood: &Neighborhood) -> f32 {
        let stats = self.corpus.stats(self.background, index);
        let weights = &self.options.weights;

        let color = stats.average.distance_sq(target);

        let texture = match source.texture.class {
            TextureClass::Solid if stats.variance > TEXTURED_GLYPH_VARIANCE => SOLID_SOURCE_PENALTY,
            TextureClass::Edge if stats.variance < FLAT_GLYPH_VARIANCE => EDGE_SOURCE_PENALTY,
            _ => 0.0,
        };

        let glyph = self.corpus.character(index);
        let repeats = hood.glyphs.iter().filter(|g| **g == glyph).count();
        let pattern = REPEAT_PENALTY * repeats as f32;

        let contrast = if hood.luminances.is_empty() {
            0.0
        } else {
            let around = hood.luminances.iter().sum::<f32>() / hood.luminances.len() as f32;
            ((source.luminance - around) - (stats.luminance - around)).powi(2)
        };

        weights.color * color
            + weights.texture * texture
            + weights.pattern * pattern
            + weights.contrast * contrast
    }

    fn neighborhood<'m>(&self, mosaic: &'m Mosaic, col: usize, row: usize) -> Neighborhood<'m> {
        let mut hood = Neighborhood::default();
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = col as i64 + dx;
            let ny = row as i64 + dy;
            if nx < 0 || ny < 0 || nx >= mosaic.cols() as i64 || ny >= mosaic.rows() as i64 {
                continue;
            }
            let glyph = mosaic.get(nx as usize, ny as usize);
            hood.glyphs.push(glyph);
            if let Some(index) = self.corpus.index_of(glyph) {
                hood.luminances.push(self.corpus.meta(index).avg_luminance);
            }
        }
        hood
    }

    /// Nearest entries by average colour plus random picks from the
    /// exploration pool.
    fn candidates<R: Rng + ?Sized>(&self, target: Rgb, rng: &mut R) -> Vec<usize> {
        let mut ranked: Vec<(usize, f32)> = self
            .corpus
            .all_stats(self.background)
            .iter()
            .map(|s| s.average.distance_sq(target))
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let nearest = self
            .options
            .candidates
            .saturating_sub(self.options.random_candidates)
            .min(ranked.len());
        let mut out: Vec<usize> = ranked[..nearest].iter().map(|c| c.0).collect();

        let pool = self.options.exploration_pool.min(ranked.len());
        if pool > 0 {
            for _ in 0..self.options.random_candidates {
                out.push(ranked[rng.gen_range(0..pool)].0);
            }
        }
        out
    }
}

/// Annealing acceptance of a candidate scoring no better than the best.
///
/// At temperature 0 or below only strict improvements are accepted.
fn accept_worse<R: Rng + ?Sized>(best: f32, score: f32, temperature: f32, rng: &mut R) -> bool {
    if temperature <= 0.0 {
        return false;
    }
    rng.gen::<f32>() < ((best - score) / temperature).exp()
}
