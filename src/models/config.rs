use std::path::Path;

use emoji_mosaic::{ChannelWeights, DiffuserOptions, MatchMode, MatchOptions, RefinePolicy};
use serde::Deserialize;

/// Application configuration loaded from a YAML file
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub matcher: MatcherConfig,
    pub refine: RefineConfig,
    pub diffuse: DiffuseConfig,

    /// Seed for every random choice; entropy when unset
    pub seed: Option<u64>,
}

/// Block sampling and per-cell matching
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MatcherConfig {
    /// Background the mosaic will be displayed on
    pub background: String,

    /// Mosaic width in glyphs
    pub columns: usize,

    /// Row scale for fonts whose glyphs are not square
    pub emoji_aspect: f32,

    pub mode: MatchMode,

    /// Sample among this many closest glyphs (1 = best only)
    pub diversity: usize,

    /// Penalise the last N choices (0 = off)
    pub avoid_recent: usize,

    /// Use the PCA embeddings when an embedding corpus is supplied
    pub compressed: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            background: "white".to_string(),
            columns: 30,
            emoji_aspect: 1.0,
            mode: MatchMode::Color,
            diversity: 1,
            avoid_recent: 0,
            compressed: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefinePolicyKind {
    Unconditional,
    #[default]
    Selective,
}

/// 2×2 quad refinement
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RefineConfig {
    pub enabled: bool,
    pub policy: RefinePolicyKind,

    /// Selective policy: replace only when the best quad is closer than this
    pub threshold: f32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: RefinePolicyKind::Selective,
            threshold: emoji_mosaic::refine::DEFAULT_SELECTIVE_THRESHOLD,
        }
    }
}

/// Annealing diffusion
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DiffuseConfig {
    pub enabled: bool,
    pub iterations: usize,
    pub initial_temperature: f32,
    pub cooling_rate: f32,
    pub weights: WeightsConfig,
}

impl Default for DiffuseConfig {
    fn default() -> Self {
        let defaults = DiffuserOptions::default();
        Self {
            enabled: true,
            iterations: defaults.iterations,
            initial_temperature: defaults.initial_temperature,
            cooling_rate: defaults.cooling_rate,
            weights: WeightsConfig::default(),
        }
    }
}

/// Channel weights of the diffuser score
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WeightsConfig {
    pub color: f32,
    pub texture: f32,
    pub pattern: f32,
    pub contrast: f32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        let w = ChannelWeights::default();
        Self {
            color: w.color,
            texture: w.texture,
            pattern: w.pattern,
            contrast: w.contrast,
        }
    }
}

impl From<WeightsConfig> for ChannelWeights {
    fn from(w: WeightsConfig) -> Self {
        ChannelWeights {
            color: w.color,
            texture: w.texture,
            pattern: w.pattern,
            contrast: w.contrast,
        }
    }
}

impl AppConfig {
    /// Parse a configuration document
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load configuration from `path`, falling back to defaults
    ///
    /// A missing path, unreadable file or invalid YAML is logged and
    /// replaced by [`AppConfig::default`].
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        background = %config.matcher.background,
                        columns = config.matcher.columns,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions::new()
            .mode(self.matcher.mode)
            .diversity(self.matcher.diversity)
            .avoid_recent(self.matcher.avoid_recent)
    }

    /// Refinement policy, or `None` when refinement is disabled
    pub fn refine_policy(&self) -> Option<RefinePolicy> {
        if !self.refine.enabled {
            return None;
        }
        Some(match self.refine.policy {
            RefinePolicyKind::Unconditional => RefinePolicy::Unconditional,
            RefinePolicyKind::Selective => RefinePolicy::Selective {
                threshold: self.refine.threshold,
            },
        })
    }

    /// Diffuser options, or `None` when diffusion is disabled
    pub fn diffuser_options(&self) -> Option<DiffuserOptions> {
        if !self.diffuse.enabled {
            return None;
        }
        Some(
            DiffuserOptions::new()
                .iterations(self.diffuse.iterations)
                .initial_temperature(self.diffuse.initial_temperature)
                .cooling_rate(self.diffuse.cooling_rate)
                .weights(self.diffuse.weights.into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.matcher.background, "white");
        assert_eq!(config.matcher.columns, 30);
        assert_eq!(config.matcher.diversity, 1);
        assert!(config.matcher.compressed);
        assert_eq!(config.seed, None);
        assert_eq!(
            config.refine_policy(),
            Some(RefinePolicy::Selective { threshold: 0.8 })
        );
        assert_eq!(config.diffuser_options(), Some(DiffuserOptions::default()));
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
matcher:
  background: discord_dark
  columns: 48
  mode: grayscale
refine:
  policy: unconditional
diffuse:
  enabled: false
seed: 42
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.matcher.background, "discord_dark");
        assert_eq!(config.matcher.columns, 48);
        assert_eq!(config.matcher.mode, MatchMode::Grayscale);
        // Unset fields keep their defaults
        assert_eq!(config.matcher.emoji_aspect, 1.0);
        assert_eq!(config.refine_policy(), Some(RefinePolicy::Unconditional));
        assert_eq!(config.diffuser_options(), None);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_parse_weights() {
        let yaml = r#"
diffuse:
  iterations: 2
  weights:
    pattern: 0.0
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        let options = config.diffuser_options().unwrap();
        assert_eq!(options.iterations, 2);
        assert_eq!(options.weights.pattern, 0.0);
        assert_eq!(options.weights.color, 1.0);
        assert_eq!(options.weights.contrast, 0.4);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(AppConfig::from_yaml_str("").unwrap(), AppConfig::default());
        assert_eq!(AppConfig::from_yaml_str("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(AppConfig::from_yaml_str("matcher: [1, 2").is_err());
        assert!(AppConfig::from_yaml_str("refine:\n  policy: sometimes").is_err());
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        assert_eq!(AppConfig::load(None), AppConfig::default());

        let missing = Path::new("/nonexistent/emojify.yaml");
        assert_eq!(AppConfig::load(Some(missing)), AppConfig::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "matcher: [unclosed").unwrap();
        assert_eq!(AppConfig::load(Some(file.path())), AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "matcher:\n  avoid_recent: 3").unwrap();
        let config = AppConfig::load(Some(file.path()));
        assert_eq!(config.match_options().avoid_recent, 3);
    }
}
