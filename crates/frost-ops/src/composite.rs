//! Porter-Duff compositing on premultiplied 8-bit pixels.
//!
//! Alpha sits at index 3 in every supported layout, and the color
//! channels are treated independently. So the same routine works for
//! premultiplied RGBA and BGRA.
//!
//! # Example
//!
//! ```rust
//! use frost_ops::composite::over_premultiplied;
//!
//! let half_white = [128, 128, 128, 128];
//! let black = [0, 0, 0, 255];
//! assert_eq!(over_premultiplied(half_white, black), [128, 128, 128, 255]);
//! ```

/// Composites `src` over `dst` (Porter-Duff Over).
///
/// Premultiplied form: `out = src + dst * (1 - src.alpha)`.
#[inline]
pub fn over_premultiplied(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mix = |s: u8, d: u8| (s as u32 + (d as u32 * inv + 127) / 255).min(255) as u8;
    [
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        mix(src[3], dst[3]),
    ]
}

/// Composites a premultiplied `src` over the 4-byte pixel slice `dst`.
#[inline]
pub fn over_in_place(src: [u8; 4], dst: &mut [u8]) {
    let out = over_premultiplied(src, [dst[0], dst[1], dst[2], dst[3]]);
    dst.copy_from_slice(&out);
}
