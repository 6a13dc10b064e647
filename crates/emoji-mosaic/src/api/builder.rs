//! EmojiMosaic builder, the primary entry point for the crate.
//!
//! [`EmojiMosaic`] wires the stages together: block sampling, per-cell
//! matching, optional quad refinement and optional annealing diffusion.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::MosaicError;
use crate::color::{background_color, Rgb};
use crate::corpus::{Corpus, EmbeddingCorpus};
use crate::diffuse::{DiffuserOptions, IterationReport, JaDiffuser};
use crate::matcher::{
    image_to_mosaic, CompressedMatcher, EmojiMatch, MatchMode, MatchOptions, StructuralMatcher,
};
use crate::output::Mosaic;
use crate::refine::{QuadCodebook, QuadRefiner, RefinePolicy, RefineStatus};
use crate::sample::{MosaicLayout, SourceImage};

/// Scores of the diffusion stage.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionSummary {
    pub initial_score: f32,
    pub final_score: f32,
    pub iterations: Vec<IterationReport>,
}

/// Result of [`EmojiMosaic::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicReport {
    pub mosaic: Mosaic,
    pub layout: MosaicLayout,
    /// Whether the PCA matcher produced the initial mosaic
    pub compressed: bool,
    /// `None` when quad refinement was not requested
    pub refine_status: Option<RefineStatus>,
    pub quads_replaced: usize,
    /// `None` when diffusion was not requested
    pub diffusion: Option<DiffusionSummary>,
}

/// High-level emoji mosaic builder.
///
/// # Design
///
/// - Constructor requires the feature [`Corpus`]; everything else is
///   optional
/// - Configuration methods consume and return `self`
/// - [`render()`](Self::render) takes `&self` so the builder is reusable
///   across images; each call draws from a fresh generator seeded by
///   [`seed()`](Self::seed), or from entropy when no seed is set
///
/// # Example
///
/// ```
/// use emoji_mosaic::{Cell, Corpus, CorpusEntry, EmojiMosaic, FeatureGrid, Rgb, SourceImage};
///
/// let solid = |v: f32| FeatureGrid::uniform(4, Cell::new(v, v, v, 1.0));
/// let corpus = Corpus::from_entries(
///     4,
///     vec!["white".into()],
///     vec![
///         CorpusEntry::new("⬜").with_grid("white", solid(1.0)),
///         CorpusEntry::new("⬛").with_grid("white", solid(0.0)),
///     ],
/// )
/// .unwrap();
///
/// let image = SourceImage::from_fn(8, 4, |x, _| {
///     let v = if x < 4 { 0 } else { 255 };
///     [v, v, v, 255]
/// });
/// let report = EmojiMosaic::new(&corpus).columns(2).seed(7).render(&image).unwrap();
/// assert_eq!(report.mosaic.to_string(), "⬛⬜");
/// ```
#[derive(Debug, Clone)]
pub struct EmojiMosaic<'a> {
    corpus: &'a Corpus,
    embeddings: Option<&'a EmbeddingCorpus>,
    codebook: Option<&'a QuadCodebook>,
    background: String,
    columns: usize,
    emoji_aspect: f32,
    match_opts: MatchOptions,
    refine: Option<RefinePolicy>,
    diffuse: Option<DiffuserOptions>,
    seed: Option<u64>,
}

impl<'a> EmojiMosaic<'a> {
    /// Create a builder over `corpus`.
    ///
    /// Defaults: background `"white"`, 30 columns, square cells, best-only
    /// colour matching, no refinement, no diffusion.
    pub fn new(corpus: &'a Corpus) -> Self {
        Self {
            corpus,
            embeddings: None,
            codebook: None,
            background: "white".to_string(),
            columns: 30,
            emoji_aspect: 1.0,
            match_opts: MatchOptions::default(),
            refine: None,
            diffuse: None,
            seed: None,
        }
    }

    /// Background the glyphs will be displayed on.
    #[inline]
    pub fn background(mut self, name: impl Into<String>) -> Self {
        self.background = name.into();
        self
    }

    /// Mosaic width in glyphs.
    #[inline]
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Row scale for fonts whose glyphs are not square.
    #[inline]
    pub fn emoji_aspect(mut self, aspect: f32) -> Self {
        self.emoji_aspect = aspect;
        self
    }

    #[inline]
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.match_opts = self.match_opts.mode(mode);
        self
    }

    #[inline]
    pub fn diversity(mut self, k: usize) -> Self {
        self.match_opts = self.match_opts.diversity(k);
        self
    }

    #[inline]
    pub fn avoid_recent(mut self, count: usize) -> Self {
        self.match_opts = self.match_opts.avoid_recent(count);
        self
    }

    /// Replace all matching options at once.
    #[inline]
    pub fn match_options(mut self, options: MatchOptions) -> Self {
        self.match_opts = options;
        self
    }

    /// Match with the PCA embeddings instead of full grids.
    #[inline]
    pub fn compressed(mut self, embeddings: &'a EmbeddingCorpus) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    #[inline]
    pub fn codebook(mut self, codebook: &'a QuadCodebook) -> Self {
        self.codebook = Some(codebook);
        self
    }

    /// Enable quad refinement. Without a codebook the stage reports
    /// [`RefineStatus::Skipped`].
    #[inline]
    pub fn refine(mut self, policy: RefinePolicy) -> Self {
        self.refine = Some(policy);
        self
    }

    /// Enable annealing diffusion.
    #[inline]
    pub fn diffuse(mut self, options: DiffuserOptions) -> Self {
        self.diffuse = Some(options);
        self
    }

    /// Seed every stochastic choice for reproducible output.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Render `image` with a generator from the configured seed.
    pub fn render(&self, image: &SourceImage) -> Result<MosaicReport, MosaicError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.render_with_rng(image, &mut rng)
    }

    /// Render `image` drawing randomness from `rng`.
    ///
    /// # Errors
    ///
    /// [`MosaicError::Configuration`] if the image has no pixels, the
    /// background is not in the corpus or a stage receives mismatched
    /// dimensions.
    pub fn render_with_rng<R: Rng + ?Sized>(
        &self,
        image: &SourceImage,
        rng: &mut R,
    ) -> Result<MosaicReport, MosaicError> {
        image.ensure_not_empty()?;
        let background = self.corpus.background_id(&self.background)?;
        let backdrop = background_color(&self.background).unwrap_or_else(|| {
            tracing::warn!(
                background = %self.background,
                "No known colour for background, compositing over white"
            );
            Rgb::WHITE
        });
        let layout = MosaicLayout::for_image(image, self.columns, self.emoji_aspect);

        let compressed = self.embeddings.and_then(|embeddings| {
            let matcher = CompressedMatcher::new(embeddings);
            match matcher.background_id(&self.background) {
                Ok(id) => Some((matcher, id)),
                Err(_) => {
                    tracing::warn!(
                        background = %self.background,
                        "Embedding corpus has no basis for background, using structural matcher"
                    );
                    None
                }
            }
        });

        let mut mosaic = match compressed {
            Some((matcher, id)) => {
                image_to_mosaic(&matcher, image, &layout, id, backdrop, &self.match_opts, rng)?
            }
            None => {
                let matcher = StructuralMatcher::new(self.corpus);
                image_to_mosaic(
                    &matcher,
                    image,
                    &layout,
                    background,
                    backdrop,
                    &self.match_opts,
                    rng,
                )?
            }
        };
        tracing::debug!(
            cols = layout.cols,
            rows = layout.rows,
            compressed = compressed.is_some(),
            "Initial mosaic matched"
        );

        let mut refine_status = None;
        let mut quads_replaced = 0;
        if let Some(policy) = self.refine {
            let outcome = QuadRefiner::new(self.codebook).refine(&mosaic, image, &layout, policy, rng)?;
            refine_status = Some(outcome.status);
            quads_replaced = outcome.replaced;
            mosaic = outcome.mosaic;
        }

        let mut diffusion = None;
        if let Some(options) = &self.diffuse {
            let diffuser = JaDiffuser::new(self.corpus, background, options.clone());
            let outcome = diffuser.diffuse(&mosaic, image, &layout, backdrop, rng)?;
            diffusion = Some(DiffusionSummary {
                initial_score: outcome.initial_score,
                final_score: outcome.final_score,
                iterations: outcome.iterations,
            });
            mosaic = outcome.mosaic;
        }

        Ok(MosaicReport {
            mosaic,
            layout,
            compressed: compressed.is_some(),
            refine_status,
            quads_replaced,
            diffusion,
        })
    }
}
