//! Test fixtures: small artifacts and images written to a temp directory.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// Glyphs of the fixture corpus and their solid colours
pub const GLYPHS: &[(&str, [f32; 3])] = &[
    ("⬜", [1.0, 1.0, 1.0]),
    ("⬛", [0.0, 0.0, 0.0]),
    ("🟥", [1.0, 0.0, 0.0]),
    ("🟦", [0.0, 0.0, 1.0]),
];

/// Backgrounds of the fixture corpus
pub const BACKGROUNDS: &[&str] = &["white", "black"];

/// Grid size of the fixture corpus
pub const GRID: usize = 2;

/// Glyph written by the fixture codebook; deliberately not in the corpus
pub const QUAD_GLYPH: &str = "🏳";

/// Feature corpus of solid glyphs, identical on every background
pub fn corpus_json() -> Value {
    let emojis: Vec<Value> = GLYPHS
        .iter()
        .map(|(c, [r, g, b])| {
            let cells: Vec<Value> = (0..GRID * GRID)
                .map(|_| json!({"r": r, "g": g, "b": b, "a": 1.0}))
                .collect();
            let grids: serde_json::Map<String, Value> = BACKGROUNDS
                .iter()
                .map(|bg| (bg.to_string(), Value::from(cells.clone())))
                .collect();
            json!({"c": c, "g": grids})
        })
        .collect();
    json!({
        "version": 1,
        "gridSize": GRID,
        "backgrounds": BACKGROUNDS,
        "emojis": emojis,
    })
}

/// Embedding corpus whose three components sum the r, g and b channels
pub fn embeddings_json() -> Value {
    let input_len = GRID * GRID * 5;
    let eigenvectors: Vec<Vec<f32>> = (0..3)
        .map(|channel| {
            (0..input_len)
                .map(|i| if i % 5 == channel { 1.0 } else { 0.0 })
                .collect()
        })
        .collect();
    let basis = json!({"mean": vec![0.0; input_len], "eigenvectors": eigenvectors});
    let cells = (GRID * GRID) as f32;
    let emojis: Vec<Value> = GLYPHS
        .iter()
        .map(|(c, [r, g, b])| {
            json!({"c": c, "e": {"white": [r * cells, g * cells, b * cells]}})
        })
        .collect();
    json!({
        "version": 1,
        "gridSize": GRID,
        "embeddingDim": 3,
        "backgrounds": ["white"],
        "pca": {"white": basis},
        "emojis": emojis,
    })
}

/// Codebook with one all-white pattern mapped to [`QUAD_GLYPH`]
pub fn codebook_json(dist: f32) -> Value {
    let pattern = vec![[255, 255, 255]; 256];
    json!({
        "version": 1,
        "background": "white",
        "gridSize": 16,
        "patterns": [{
            "name": "blank",
            "type": "solid",
            "pattern": pattern,
            "quads": [{"chars": [QUAD_GLYPH, QUAD_GLYPH, QUAD_GLYPH, QUAD_GLYPH], "dist": dist}],
        }],
    })
}

/// Encode an RGBA buffer as PNG
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(rgba).unwrap();
    }
    buf.into_inner()
}

/// RGBA image whose left half is red and right half is blue
pub fn red_blue_rgba(width: u32, height: u32) -> Vec<u8> {
    (0..height)
        .flat_map(|_| (0..width))
        .flat_map(|x| {
            if x < width / 2 {
                [255, 0, 0, 255]
            } else {
                [0, 0, 255, 255]
            }
        })
        .collect()
}

/// Solid opaque RGBA image
pub fn solid_rgba(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    (0..width * height)
        .flat_map(|_| [rgb[0], rgb[1], rgb[2], 255])
        .collect()
}

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    write_file(dir, name, value.to_string().as_bytes())
}
