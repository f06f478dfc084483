//! Pixel formats and colors.
//!
//! # Types
//!
//! - [`PixelFormat`] - Byte layout of a 32-bit, 4-channel pixel
//! - [`Rgba`] - Straight-alpha color with `f32` components
//!
//! # Working Format
//!
//! Filters operate on [`PixelFormat::WORKING`]: 8 bits per channel,
//! premultiplied, alpha stored in the high byte of a little-endian
//! 32-bit word. In memory that is `[B, G, R, A]`:
//!
//! ```text
//! byte:   0   1   2   3
//!         B   G   R   A     (premultiplied)
//! ```
//!
//! All conversions go through premultiplied RGBA, so any pair of formats
//! can be converted with [`PixelFormat::convert`].

/// Byte layout of a 4-channel, 8-bit-per-channel pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// `[R, G, B, A]`, straight alpha.
    #[default]
    Rgba8,
    /// `[B, G, R, A]`, straight alpha.
    Bgra8,
    /// `[R, G, B, A]`, color pre-scaled by alpha.
    Rgba8Premultiplied,
    /// `[B, G, R, A]`, color pre-scaled by alpha.
    Bgra8Premultiplied,
}

impl PixelFormat {
    /// Format used by the blur pipeline internally and for its output.
    pub const WORKING: PixelFormat = PixelFormat::Bgra8Premultiplied;

    /// Bytes per pixel. Always 4.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Returns `true` if color channels are stored pre-scaled by alpha.
    #[inline]
    pub const fn is_premultiplied(self) -> bool {
        matches!(self, Self::Rgba8Premultiplied | Self::Bgra8Premultiplied)
    }

    /// Returns `true` if red and blue are swapped relative to RGBA.
    #[inline]
    pub const fn is_bgra(self) -> bool {
        matches!(self, Self::Bgra8 | Self::Bgra8Premultiplied)
    }

    /// Converts one pixel in this format to premultiplied `[R, G, B, A]`.
    #[inline]
    pub fn to_premultiplied_rgba(self, px: [u8; 4]) -> [u8; 4] {
        let [r, g, b, a] = if self.is_bgra() {
            [px[2], px[1], px[0], px[3]]
        } else {
            px
        };
        if self.is_premultiplied() {
            [r, g, b, a]
        } else {
            [premultiply(r, a), premultiply(g, a), premultiply(b, a), a]
        }
    }

    /// Converts one premultiplied `[R, G, B, A]` pixel into this format.
    #[inline]
    pub fn from_premultiplied_rgba(self, px: [u8; 4]) -> [u8; 4] {
        let [r, g, b, a] = if self.is_premultiplied() {
            px
        } else {
            [
                unpremultiply(px[0], px[3]),
                unpremultiply(px[1], px[3]),
                unpremultiply(px[2], px[3]),
                px[3],
            ]
        };
        if self.is_bgra() { [b, g, r, a] } else { [r, g, b, a] }
    }

    /// Converts one pixel from this format to `target`.
    #[inline]
    pub fn convert(self, target: PixelFormat, px: [u8; 4]) -> [u8; 4] {
        if self == target {
            return px;
        }
        target.from_premultiplied_rgba(self.to_premultiplied_rgba(px))
    }
}

/// Scales a color channel by alpha, rounding to nearest.
#[inline]
pub fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}

/// Undoes [`premultiply`]. Fully transparent pixels become black.
#[inline]
pub fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
}

/// Straight-alpha color with `f32` components in `[0, 1]`.
///
/// Used as the tint overlay color. Values outside `[0, 1]` are clamped
/// when converted to pixels.
///
/// # Example
///
/// ```rust
/// use frost_core::Rgba;
///
/// let tint = Rgba::new(1.0, 1.0, 1.0, 0.5);
/// assert_eq!(tint.premultiplied_u8(), [128, 128, 128, 128]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha (opacity)
    pub a: f32,
}

impl Rgba {
    /// Creates a color from straight-alpha components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from 8-bit straight-alpha components.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Opaque black.
    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Opaque white.
    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Fully transparent black.
    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Returns a copy with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Premultiplied 8-bit `[R, G, B, A]`.
    pub fn premultiplied_u8(self) -> [u8; 4] {
        let a = self.a.clamp(0.0, 1.0);
        let q = |v: f32| (v.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), (a * 255.0).round() as u8]
    }

    /// The color as one pixel in `format`.
    pub fn to_pixel(self, format: PixelFormat) -> [u8; 4] {
        format.from_premultiplied_rgba(self.premultiplied_u8())
    }
}
