//! Configuration-driven mosaic rendering
//!
//! Applies an [`AppConfig`] to the core [`EmojiMosaic`] builder and runs it
//! against the loaded artifacts.

use std::time::{Duration, Instant};

use emoji_mosaic::{EmojiMosaic, RefineStatus, SourceImage};

use crate::error::AppError;
use crate::models::AppConfig;
use crate::services::AssetStore;

/// Outcome of one render
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Mosaic text, rows joined by newlines
    pub text: String,
    pub cols: usize,
    pub rows: usize,
    pub compressed: bool,
    pub refine_status: Option<RefineStatus>,
    pub quads_replaced: usize,
    /// Diffuser score before and after, when diffusion ran
    pub diffusion_scores: Option<(f32, f32)>,
    pub elapsed: Duration,
}

/// Renders images with a fixed configuration and artifact set
pub struct MosaicPipeline<'a> {
    assets: &'a AssetStore,
    config: &'a AppConfig,
}

impl<'a> MosaicPipeline<'a> {
    pub fn new(assets: &'a AssetStore, config: &'a AppConfig) -> Self {
        Self { assets, config }
    }

    /// Core builder configured from the application config
    pub fn builder(&self) -> EmojiMosaic<'a> {
        let (assets, config) = (self.assets, self.config);
        let mut builder = EmojiMosaic::new(&assets.corpus)
            .background(config.matcher.background.as_str())
            .columns(config.matcher.columns)
            .emoji_aspect(config.matcher.emoji_aspect)
            .match_options(config.match_options());

        if config.matcher.compressed {
            if let Some(embeddings) = &assets.embeddings {
                builder = builder.compressed(embeddings);
            }
        }
        if let Some(codebook) = &assets.codebook {
            builder = builder.codebook(codebook);
        }
        if let Some(policy) = config.refine_policy() {
            builder = builder.refine(policy);
        }
        if let Some(options) = config.diffuser_options() {
            builder = builder.diffuse(options);
        }
        if let Some(seed) = config.seed {
            builder = builder.seed(seed);
        }
        builder
    }

    /// Render `image` into mosaic text
    pub fn run(&self, image: &SourceImage) -> Result<PipelineReport, AppError> {
        let start = Instant::now();
        let report = self.builder().render(image)?;
        let elapsed = start.elapsed();

        let diffusion_scores = report
            .diffusion
            .as_ref()
            .map(|d| (d.initial_score, d.final_score));

        tracing::info!(
            width = image.width(),
            height = image.height(),
            cols = report.layout.cols,
            rows = report.layout.rows,
            compressed = report.compressed,
            quads_replaced = report.quads_replaced,
            elapsed_ms = elapsed.as_millis() as u64,
            "Rendered mosaic"
        );

        Ok(PipelineReport {
            text: report.mosaic.to_string(),
            cols: report.layout.cols,
            rows: report.layout.rows,
            compressed: report.compressed,
            refine_status: report.refine_status,
            quads_replaced: report.quads_replaced,
            diffusion_scores,
            elapsed,
        })
    }
}
