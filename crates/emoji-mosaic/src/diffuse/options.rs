//! Diffuser options.

use super::kernel::{Kernel, FLOYD_STEINBERG};

/// Relative weight of each scoring channel.
///
/// # Example
///
/// ```
/// use emoji_mosaic::ChannelWeights;
///
/// let weights = ChannelWeights::default();
/// assert_eq!(weights.color, 1.0);
/// assert_eq!(weights.contrast, 0.4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelWeights {
    /// Squared RGB distance to the error-adjusted target
    pub color: f32,
    /// Source texture class vs glyph variance
    pub texture: f32,
    /// Repetition among the 8 neighbours
    pub pattern: f32,
    /// Light/dark relation to the neighbourhood
    pub contrast: f32,
}

impl Default for ChannelWeights {
    fn default() -> Self {
        Self {
            color: 1.0,
            texture: 0.3,
            pattern: 0.2,
            contrast: 0.4,
        }
    }
}

/// Annealing schedule and scoring configuration.
///
/// # Defaults
///
/// - iterations: 5 forward+backward cycles
/// - initial temperature 1.0, cooled by 0.92 after every cycle
/// - 20 candidates per cell, 5 of them random picks from the nearest 100
/// - Floyd-Steinberg diffusion in the forward pass
///
/// # Example
///
/// ```
/// use emoji_mosaic::DiffuserOptions;
///
/// let greedy = DiffuserOptions::new().initial_temperature(0.0).iterations(2);
/// assert_eq!(greedy.iterations, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiffuserOptions {
    pub weights: ChannelWeights,

    /// Full forward+backward cycles; always run to completion.
    pub iterations: usize,

    /// Starting temperature. At 0 only strictly better candidates are
    /// accepted.
    pub initial_temperature: f32,

    /// Multiplier applied to the temperature after each cycle.
    pub cooling_rate: f32,

    /// Candidates scored per cell, including the random ones.
    pub candidates: usize,

    /// Of `candidates`, how many are random picks for exploration.
    pub random_candidates: usize,

    /// Random picks are drawn from this many nearest entries.
    pub exploration_pool: usize,

    pub kernel: Kernel,
}

impl Default for DiffuserOptions {
    fn default() -> Self {
        Self {
            weights: ChannelWeights::default(),
            iterations: 5,
            initial_temperature: 1.0,
            cooling_rate: 0.92,
            candidates: 20,
            random_candidates: 5,
            exploration_pool: 100,
            kernel: FLOYD_STEINBERG,
        }
    }
}

impl DiffuserOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn weights(mut self, weights: ChannelWeights) -> Self {
        self.weights = weights;
        self
    }

    #[inline]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[inline]
    pub fn initial_temperature(mut self, temperature: f32) -> Self {
        self.initial_temperature = temperature;
        self
    }

    #[inline]
    pub fn cooling_rate(mut self, rate: f32) -> Self {
        self.cooling_rate = rate;
        self
    }

    /// Set the candidate budget and how much of it is random.
    #[inline]
    pub fn candidates(mut self, total: usize, random: usize) -> Self {
        self.candidates = total;
        self.random_candidates = random.min(total);
        self
    }
}
