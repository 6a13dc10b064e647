//! Wire formats of the offline artifacts.
//!
//! These mirror the JSON written by the corpus tooling field for field and
//! are converted into the resolved in-memory types immediately after
//! parsing.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct CorpusFile {
    #[serde(default)]
    pub version: u32,
    #[serde(rename = "gridSize")]
    pub grid_size: usize,
    pub backgrounds: Vec<String>,
    pub emojis: Vec<EntryRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntryRecord {
    pub c: String,
    #[serde(default)]
    pub m: Option<MetaRecord>,
    pub g: HashMap<String, Vec<CellRecord>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MetaRecord {
    #[serde(rename = "avgAlpha", default)]
    pub avg_alpha: f32,
    #[serde(rename = "avgLuminance", default)]
    pub avg_luminance: f32,
    #[serde(rename = "avgColor", default)]
    pub avg_color: [f32; 3],
}

/// `l` is accepted but recomputed from r, g, b on load.
#[derive(Debug, Deserialize)]
pub(crate) struct CellRecord {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default)]
    #[allow(dead_code)]
    pub l: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingFile {
    #[serde(default)]
    pub version: u32,
    #[serde(rename = "gridSize", default = "default_embedding_grid")]
    pub grid_size: usize,
    #[serde(rename = "embeddingDim")]
    pub embedding_dim: usize,
    pub backgrounds: Vec<String>,
    pub pca: HashMap<String, BasisRecord>,
    pub emojis: Vec<EmbeddingRecord>,
}

fn default_embedding_grid() -> usize {
    4
}

#[derive(Debug, Deserialize)]
pub(crate) struct BasisRecord {
    pub mean: Vec<f32>,
    pub eigenvectors: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingRecord {
    pub c: String,
    #[serde(default)]
    pub m: Option<MetaRecord>,
    pub e: HashMap<String, Vec<f32>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CodebookFile {
    #[serde(default)]
    pub version: u32,
    pub background: String,
    #[serde(rename = "gridSize", default)]
    pub grid_size: usize,
    pub patterns: Vec<PatternRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PatternRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pattern: Vec<[f32; 3]>,
    #[serde(default)]
    pub quads: Vec<QuadRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuadRecord {
    pub chars: [String; 4],
    pub dist: f32,
}
