//! Box kernel sizing.
//!
//! Three passes of a box filter of width `d` approximate a Gaussian of
//! standard deviation `s` when
//!
//! ```text
//! d = floor(s * 3 * sqrt(2 * pi) / 4 + 0.5)
//! ```
//!
//! The box is centered on the output pixel, so its size must be odd. The
//! value above is halved and then forced odd by setting the low bit.
//!
//! # Example
//!
//! ```rust
//! use frost_ops::kernel::BoxKernel;
//!
//! let k = BoxKernel::for_radius(10.0, 1.0).unwrap();
//! assert_eq!(k.size, 9);
//! assert_eq!(k.half(), 4);
//! ```

use crate::{OpsError, OpsResult};

/// Scaled radii at or below this are clamped up to it.
pub const MIN_SCALED_RADIUS: f64 = 2.0;

/// Converts a logical blur radius to device pixels.
///
/// Anything that would come out at or below [`MIN_SCALED_RADIUS`]
/// (within `f64::EPSILON`) is clamped to exactly that value.
#[inline]
pub fn effective_radius(radius: f64, scale: f64) -> f64 {
    let scaled = radius * scale;
    if scaled - MIN_SCALED_RADIUS < f64::EPSILON {
        MIN_SCALED_RADIUS
    } else {
        scaled
    }
}

/// Odd box kernel size for a radius already in device pixels.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if the radius is not finite or the
/// kernel would not fit in `u32`.
pub fn kernel_size(scaled_radius: f64) -> OpsResult<u32> {
    let sq2pi = (2.0 * std::f64::consts::PI).sqrt();
    let size = ((scaled_radius * 3.0 * sq2pi / 4.0 + 0.5) / 2.0).floor();
    if !size.is_finite() || size < 0.0 || size > u32::MAX as f64 {
        return Err(OpsError::InvalidParameter(format!(
            "blur radius {scaled_radius} gives an unusable kernel size"
        )));
    }
    Ok(size as u32 | 1)
}

/// Square box kernel used by every blur pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxKernel {
    /// Side length in pixels (always odd).
    pub size: u32,
}

impl BoxKernel {
    /// Kernel for a logical `radius` on a bitmap with the given `scale`.
    pub fn for_radius(radius: f64, scale: f64) -> OpsResult<Self> {
        let size = kernel_size(effective_radius(radius, scale))?;
        Ok(Self { size })
    }

    /// Pixels on each side of the center tap.
    #[inline]
    pub fn half(&self) -> usize {
        (self.size / 2) as usize
    }
}
