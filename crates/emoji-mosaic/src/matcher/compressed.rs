//! Approximate matcher in PCA embedding space.
//!
//! Trades fidelity for speed: a query is projected once onto the
//! background's basis and compared against the stored embeddings with
//! squared Euclidean distance. [`MatchMode`](super::MatchMode) has no
//! effect here; the embeddings already encode every channel.

use rand::Rng;

use super::options::MatchOptions;
use super::ranking;
use super::recent::RecentlyUsed;
use super::{EmojiMatch, MatchResult};
use crate::api::ConfigurationError;
use crate::corpus::{project, BackgroundId, EmbeddingCorpus, FeatureGrid};

fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[derive(Debug, Clone, Copy)]
pub struct CompressedMatcher<'a> {
    corpus: &'a EmbeddingCorpus,
}

impl<'a> CompressedMatcher<'a> {
    pub fn new(corpus: &'a EmbeddingCorpus) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &'a EmbeddingCorpus {
        self.corpus
    }

    /// Project a source grid onto the background's basis.
    pub fn embed(
        &self,
        grid: &FeatureGrid,
        background: BackgroundId,
    ) -> Result<Vec<f32>, ConfigurationError> {
        if grid.cell_count() != self.corpus.cell_count() {
            return Err(ConfigurationError::GridSizeMismatch {
                expected: self.corpus.cell_count(),
                actual: grid.cell_count(),
            });
        }
        Ok(project(&grid.flatten(), self.corpus.basis(background)))
    }

    /// Embedding distance to every entry, in corpus order.
    pub fn distances(
        &self,
        grid: &FeatureGrid,
        background: BackgroundId,
    ) -> Result<Vec<(usize, f32)>, ConfigurationError> {
        let query = self.embed(grid, background)?;
        Ok(self
            .corpus
            .embeddings(background)
            .map(|e| l2_squared(&query, e))
            .enumerate()
            .collect())
    }
}

impl EmojiMatch for CompressedMatcher<'_> {
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
        let distances = self.distances(grid, background)?;
        let (index, distance) = ranking::select(distances, recent, options, rng)
            .ok_or(ConfigurationError::EmptyCorpus)?;
        Ok(MatchResult {
            character: self.corpus.character(index).to_string(),
            distance,
            index,
        })
    }
}
