//! Decoded source image.

use crate::api::ConfigurationError;
use crate::color::Rgb;

/// An RGBA8 image, row-major, straight (non-premultiplied) alpha.
///
/// # Example
///
/// ```
/// use emoji_mosaic::SourceImage;
///
/// let image = SourceImage::from_rgba(1, 1, vec![255, 0, 0, 255]).unwrap();
/// assert_eq!(image.pixel(0, 0), [255, 0, 0, 255]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SourceImage {
    /// Wrap a tightly packed RGBA8 buffer.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidImage`] if either dimension is zero or
    /// the buffer length is not `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ConfigurationError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(ConfigurationError::InvalidImage {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image of a single opaque colour.
    ///
    /// Zero dimensions are accepted here and rejected by
    /// [`ensure_not_empty`](Self::ensure_not_empty) when the image is
    /// rendered.
    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        let [r, g, b] = color.to_bytes();
        Self::from_fn(width, height, |_, _| [r, g, b, 255])
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// # Errors
    ///
    /// [`ConfigurationError::InvalidImage`] for an image without pixels.
    pub fn ensure_not_empty(&self) -> Result<(), ConfigurationError> {
        if self.is_empty() {
            return Err(ConfigurationError::InvalidImage {
                width: self.width,
                height: self.height,
                len: self.pixels.len(),
            });
        }
        Ok(())
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Pixel colour composited over `background`.
    #[inline]
    pub fn composited(&self, x: u32, y: u32, background: Rgb) -> Rgb {
        let [r, g, b, a] = self.pixel(x, y);
        Rgb::from_u8(r, g, b).over(a as f32 / 255.0, background)
    }
}
