//! PNG decoding into the engine's RGBA source image.

use std::io::Read;
use std::path::Path;

use emoji_mosaic::SourceImage;

use crate::error::AppError;

/// Decode a PNG stream into an 8-bit RGBA [`SourceImage`].
///
/// Palette and low bit-depth images are expanded and 16-bit channels are
/// stripped to 8 bits; grayscale and RGB inputs are widened to RGBA with
/// full opacity.
pub fn decode_png<R: Read>(reader: R) -> Result<SourceImage, AppError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let data = &buf[..info.buffer_size()];

    if info.bit_depth != png::BitDepth::Eight {
        return Err(AppError::UnsupportedPng(format!(
            "{:?} bit depth after expansion",
            info.bit_depth
        )));
    }

    let pixels: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => data.to_vec(),
        png::ColorType::Rgb => data
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => data.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::Indexed => {
            return Err(AppError::UnsupportedPng(
                "indexed colour was not expanded".to_string(),
            ))
        }
    };

    tracing::debug!(
        width = info.width,
        height = info.height,
        color_type = ?info.color_type,
        "Decoded PNG"
    );
    Ok(SourceImage::from_rgba(info.width, info.height, pixels)?)
}

/// Read and decode a PNG file.
pub fn load_png(path: &Path) -> Result<SourceImage, AppError> {
    let file = std::fs::File::open(path).map_err(|e| AppError::io(path, e))?;
    decode_png(std::io::BufReader::new(file))
}
