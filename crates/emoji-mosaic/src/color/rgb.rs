//! Normalised RGB colour with the luminance and saturation helpers used by
//! the matchers and the diffuser.

use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use super::error::ParseColorError;

/// Rec. 601 luma of normalised RGB channels.
#[inline]
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// HSV-style saturation: `(max - min) / max`, zero for black.
#[inline]
pub fn saturation(r: f32, g: f32, b: f32) -> f32 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max > 0.0 {
        (max - min) / max
    } else {
        0.0
    }
}

/// A colour with channels in `0.0..=1.0`.
///
/// Intermediate values (accumulated diffusion error, residuals) may leave
/// that range; call [`clamp01`](Rgb::clamp01) before using such a value as
/// a match target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a colour from 8-bit channel values.
    ///
    /// # Example
    /// ```
    /// use emoji_mosaic::Rgb;
    /// let red = Rgb::from_u8(255, 0, 0);
    /// assert_eq!(red.r, 1.0);
    /// ```
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Rounds and clamps each channel to `0..=255`.
    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    #[inline]
    pub fn luminance(self) -> f32 {
        luminance(self.r, self.g, self.b)
    }

    #[inline]
    pub fn saturation(self) -> f32 {
        saturation(self.r, self.g, self.b)
    }

    /// Clamp every channel into `0.0..=1.0`.
    #[inline]
    pub fn clamp01(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Squared Euclidean distance in RGB.
    #[inline]
    pub fn distance_sq(self, other: Rgb) -> f32 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        dr * dr + dg * dg + db * db
    }

    /// Alpha-composite this colour with coverage `alpha` over `background`.
    #[inline]
    pub fn over(self, alpha: f32, background: Rgb) -> Self {
        self * alpha + background * (1.0 - alpha)
    }
}

impl Add for Rgb {
    type Output = Rgb;

    #[inline]
    fn add(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Sub for Rgb {
    type Output = Rgb;

    #[inline]
    fn sub(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul<f32> for Rgb {
    type Output = Rgb;

    #[inline]
    fn mul(self, rhs: f32) -> Rgb {
        Rgb::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse a colour from `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB`.
    ///
    /// Parsing is case-insensitive and ignores surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }

        match s.len() {
            3 => {
                // Shorthand: expand each digit by multiplying by 17 (0xF -> 0xFF)
                let r = u8::from_str_radix(&s[0..1], 16)? * 17;
                let g = u8::from_str_radix(&s[1..2], 16)? * 17;
                let b = u8::from_str_radix(&s[2..3], 16)? * 17;
                Ok(Self::from_u8(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&s[0..2], 16)?;
                let g = u8::from_str_radix(&s[2..4], 16)?;
                let b = u8::from_str_radix(&s[4..6], 16)?;
                Ok(Self::from_u8(r, g, b))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_weights_sum_to_one() {
        assert!((Rgb::WHITE.luminance() - 1.0).abs() < 1e-6);
        assert_eq!(Rgb::BLACK.luminance(), 0.0);
        assert!((Rgb::new(1.0, 0.0, 0.0).luminance() - 0.299).abs() < 1e-6);
    }

    #[test]
    fn test_saturation_greys_are_zero() {
        assert_eq!(saturation(0.0, 0.0, 0.0), 0.0);
        assert_eq!(saturation(0.5, 0.5, 0.5), 0.0);
        assert_eq!(saturation(1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_saturation_pure_hues_are_one() {
        assert_eq!(saturation(1.0, 0.0, 0.0), 1.0);
        assert_eq!(saturation(0.0, 0.4, 0.0), 1.0);
        assert!((saturation(1.0, 0.5, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamp01() {
        let c = Rgb::new(-0.2, 0.5, 1.7).clamp01();
        assert_eq!(c, Rgb::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn test_over_composites_against_background() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        assert_eq!(red.over(1.0, Rgb::WHITE), red);
        assert_eq!(red.over(0.0, Rgb::WHITE), Rgb::WHITE);
        let half = red.over(0.5, Rgb::BLACK);
        assert!((half.r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hex_parsing() {
        let white: Rgb = "#FFFFFF".parse().unwrap();
        assert_eq!(white, Rgb::WHITE);

        let red: Rgb = "f00".parse().unwrap();
        assert_eq!(red, Rgb::new(1.0, 0.0, 0.0));

        let padded: Rgb = "  #5865F2 ".parse().unwrap();
        assert_eq!(padded.to_bytes(), [0x58, 0x65, 0xF2]);
    }

    #[test]
    fn test_hex_parsing_errors() {
        assert!(matches!(
            "#GGG".parse::<Rgb>(),
            Err(ParseColorError::InvalidHex(_))
        ));
        assert_eq!("#FFFF".parse::<Rgb>(), Err(ParseColorError::InvalidLength));
        assert_eq!("".parse::<Rgb>(), Err(ParseColorError::InvalidLength));
        assert_eq!("#ééé".parse::<Rgb>(), Err(ParseColorError::InvalidLength));
    }
}
