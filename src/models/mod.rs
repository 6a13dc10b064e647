pub mod config;

pub use config::{
    AppConfig, DiffuseConfig, MatcherConfig, RefineConfig, RefinePolicyKind, WeightsConfig,
};
