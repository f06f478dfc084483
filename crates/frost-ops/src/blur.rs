//! Gaussian-approximating box blur with optional tint and crop.
//!
//! Three passes of a box filter converge on a Gaussian. The pipeline:
//!
//! ```text
//! source --crop?--> decode --3x box--> drawable --flip+draw--> surface --tint?--> result
//! ```
//!
//! The crop rectangle is in logical units. If it misses the bitmap
//! entirely the full source is used instead.
//!
//! # Example
//!
//! ```rust
//! use frost_core::{Bitmap, PixelFormat, Rgba};
//! use frost_ops::blur::{blur, blurred_image, BlurOptions};
//!
//! let src = Bitmap::filled(32, 32, PixelFormat::Rgba8, 1.0, [200, 40, 40, 255]).unwrap();
//! let out = blurred_image(&src, 4.0, None, None).unwrap();
//! assert_eq!((out.width(), out.height()), (32, 32));
//!
//! let opts = BlurOptions::new(4.0).with_tint(Rgba::white().with_alpha(0.3));
//! assert!(blur(&src, &opts).is_some());
//! ```

use frost_core::{try_zeroed, Bitmap, LogicalRect, Rgba};
use tracing::{debug, trace};

use crate::buffer::{PingPong, PixelBuffer};
use crate::convolve::{BoxConvolve, EdgeMode, SlidingWindowBox};
use crate::kernel::BoxKernel;
use crate::surface::{Surface, Transform};
use crate::{OpsError, OpsResult};

/// Box passes per blur.
pub const BLUR_PASSES: usize = 3;

/// Radius used by [`BlurOptions::default`].
pub const DEFAULT_RADIUS: f64 = 10.0;

/// Blur configuration.
///
/// # Example
///
/// ```rust
/// use frost_core::LogicalRect;
/// use frost_ops::blur::BlurOptions;
/// use frost_ops::convolve::EdgeMode;
///
/// let opts = BlurOptions::new(6.0)
///     .with_crop(LogicalRect::new(0.0, 0.0, 100.0, 40.0))
///     .with_edge_mode(EdgeMode::Truncate)
///     .with_opaque(false);
/// assert!(!opts.opaque);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlurOptions {
    /// Blur strength in logical units.
    pub radius: f64,
    /// Color filled over the blurred result.
    pub tint: Option<Rgba>,
    /// Region of the source to blur, in logical units.
    pub crop: Option<LogicalRect>,
    /// Sampling outside the buffer.
    pub edge_mode: EdgeMode,
    /// Start from opaque black instead of transparent.
    pub opaque: bool,
}

impl Default for BlurOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            tint: None,
            crop: None,
            edge_mode: EdgeMode::Extend,
            opaque: true,
        }
    }
}

impl BlurOptions {
    /// Options with the given radius and defaults elsewhere.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    /// Sets the tint color.
    pub fn with_tint(mut self, tint: Rgba) -> Self {
        self.tint = Some(tint);
        self
    }

    /// Sets the crop rectangle.
    pub fn with_crop(mut self, crop: LogicalRect) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Sets the edge mode.
    pub fn with_edge_mode(mut self, edge_mode: EdgeMode) -> Self {
        self.edge_mode = edge_mode;
        self
    }

    /// Sets whether the output surface starts opaque.
    pub fn with_opaque(mut self, opaque: bool) -> Self {
        self.opaque = opaque;
        self
    }
}

/// Blurs `image`, then fills `tint` over it, after an optional `crop`.
///
/// Returns `None` for a source under one logical unit or a radius below
/// `f64::EPSILON`. Allocation failures also give `None`.
pub fn blurred_image(
    image: &Bitmap,
    radius: f64,
    tint: Option<Rgba>,
    crop: Option<LogicalRect>,
) -> Option<Bitmap> {
    let options = BlurOptions {
        radius,
        tint,
        crop,
        ..BlurOptions::default()
    };
    blur(image, &options)
}

/// [`blurred_image`] driven by [`BlurOptions`].
pub fn blur(image: &Bitmap, options: &BlurOptions) -> Option<Bitmap> {
    blur_with(image, options, &SlidingWindowBox)
}

/// [`blur`] with a caller-supplied convolution.
pub fn blur_with<C>(image: &Bitmap, options: &BlurOptions, convolver: &C) -> Option<Bitmap>
where
    C: BoxConvolve + ?Sized,
{
    match try_blur_with(image, options, convolver) {
        Ok(out) => Some(out),
        Err(e) => {
            debug!(error = %e, "blur produced no result");
            None
        }
    }
}

/// Runs the blur pipeline, reporting why it produced nothing.
///
/// # Errors
///
/// - [`OpsError::DegenerateSize`] / [`OpsError::DegenerateRadius`] for
///   inputs that make the blur a no-op
/// - [`OpsError::ScratchSize`] if the convolver wants no scratch
/// - [`OpsError::Core`], [`OpsError::Drawable`], [`OpsError::Surface`]
///   for allocation and buffer failures
/// - anything the convolver itself returns
pub fn try_blur_with<C>(image: &Bitmap, options: &BlurOptions, convolver: &C) -> OpsResult<Bitmap>
where
    C: BoxConvolve + ?Sized,
{
    let (lw, lh) = image.logical_size();
    if !(lw >= 1.0 && lh >= 1.0) {
        return Err(OpsError::DegenerateSize {
            width: lw,
            height: lh,
        });
    }
    let radius = options.radius;
    if !radius.is_finite() || radius < f64::EPSILON {
        return Err(OpsError::DegenerateRadius(radius));
    }

    let cropped = options.crop.and_then(|rect| crop_source(image, rect));
    let source = cropped.as_ref().unwrap_or(image);
    let (width, height, scale) = (source.width(), source.height(), source.scale());

    let mut buffers = PingPong::with_matching(PixelBuffer::from_bitmap(source)?)?;
    drop(cropped);

    let kernel = BoxKernel::for_radius(radius, scale)?;
    let scratch_len = convolver.scratch_len(width, height, kernel.size, kernel.size);
    if scratch_len == 0 {
        return Err(OpsError::ScratchSize { width, height });
    }
    let mut scratch = try_zeroed::<u64>(scratch_len)?;
    debug!(width, height, scale, radius, kernel = kernel.size, "box blur");

    for pass in 0..BLUR_PASSES {
        let (src, dst) = buffers.split();
        convolver.convolve(src, dst, &mut scratch, kernel.size, kernel.size, options.edge_mode)?;
        buffers.swap();
        trace!(pass, "blur pass done");
    }
    drop(scratch);

    let blurred = buffers.into_front().into_bitmap(scale)?;
    composite(&blurred, options)
}

/// Crops in pixel space, or `None` to fall back to the full image.
fn crop_source(image: &Bitmap, rect: LogicalRect) -> Option<Bitmap> {
    let Some(region) = rect.to_pixels(image.scale()) else {
        debug!(?rect, "crop rect has no pixels, blurring the full image");
        return None;
    };
    match image.try_crop(region) {
        Ok(cropped) => {
            trace!(
                width = cropped.width(),
                height = cropped.height(),
                "cropped source"
            );
            Some(cropped)
        }
        Err(e) => {
            debug!(error = %e, "crop failed, blurring the full image");
            None
        }
    }
}

/// Draws `blurred` upright on a fresh surface and applies the tint.
fn composite(blurred: &Bitmap, options: &BlurOptions) -> OpsResult<Bitmap> {
    let mut surface = Surface::try_new(
        blurred.width(),
        blurred.height(),
        blurred.scale(),
        options.opaque,
    )?;
    let (lw, lh) = surface.logical_size();
    let bounds = LogicalRect::from_size(lw, lh);

    surface.save_state();
    surface.concat(Transform::scale(1.0, -1.0));
    surface.concat(Transform::translate(0.0, -lh));
    surface.draw_image(blurred, bounds)?;
    surface.restore_state();

    if let Some(tint) = options.tint {
        surface.save_state();
        surface.set_fill_color(tint);
        surface.fill_rect(bounds);
        surface.restore_state();
    }
    surface.into_bitmap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use frost_core::PixelFormat;
    use std::cell::Cell;

    const GREY: [u8; 4] = [90, 90, 90, 255];

    fn grey(w: u32, h: u32, scale: f64) -> Bitmap {
        Bitmap::filled(w, h, PixelFormat::WORKING, scale, GREY).unwrap()
    }

    struct CountingBox {
        calls: Cell<usize>,
    }

    impl BoxConvolve for CountingBox {
        fn scratch_len(&self, w: u32, h: u32, kw: u32, kh: u32) -> usize {
            SlidingWindowBox.scratch_len(w, h, kw, kh)
        }

        fn convolve(
            &self,
            src: &PixelBuffer,
            dst: &mut PixelBuffer,
            scratch: &mut [u64],
            kw: u32,
            kh: u32,
            edge: EdgeMode,
        ) -> OpsResult<()> {
            self.calls.set(self.calls.get() + 1);
            SlidingWindowBox.convolve(src, dst, scratch, kw, kh, edge)
        }
    }

    struct NoScratch;

    impl BoxConvolve for NoScratch {
        fn scratch_len(&self, _: u32, _: u32, _: u32, _: u32) -> usize {
            0
        }

        fn convolve(
            &self,
            _: &PixelBuffer,
            _: &mut PixelBuffer,
            _: &mut [u64],
            _: u32,
            _: u32,
            _: EdgeMode,
        ) -> OpsResult<()> {
            unreachable!("zero scratch must abort before convolving")
        }
    }

    #[test]
    fn test_default_options() {
        let o = BlurOptions::default();
        assert_eq!(o.radius, DEFAULT_RADIUS);
        assert!(o.tint.is_none() && o.crop.is_none());
        assert_eq!(o.edge_mode, EdgeMode::Extend);
        assert!(o.opaque);
    }

    #[test]
    fn test_builder() {
        let o = BlurOptions::new(2.5)
            .with_tint(Rgba::white())
            .with_edge_mode(EdgeMode::Background([0, 0, 0, 255]))
            .with_opaque(false);
        assert_eq!(o.radius, 2.5);
        assert_eq!(o.tint, Some(Rgba::white()));
        assert!(!o.opaque);
    }

    #[test]
    fn test_degenerate_size() {
        // 1x1 pixel at 2x is half a logical unit
        let err = try_blur_with(&grey(1, 1, 2.0), &BlurOptions::new(5.0), &SlidingWindowBox);
        assert!(matches!(err, Err(OpsError::DegenerateSize { .. })));
        assert!(blur(&grey(0, 10, 1.0), &BlurOptions::new(5.0)).is_none());
    }

    #[test]
    fn test_degenerate_radius() {
        for r in [0.0, 1e-20, -3.0, f64::NAN, f64::INFINITY] {
            let err = try_blur_with(&grey(4, 4, 1.0), &BlurOptions::new(r), &SlidingWindowBox);
            assert!(matches!(err, Err(OpsError::DegenerateRadius(_))), "radius {r}");
        }
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let out = blurred_image(&grey(12, 7, 1.0), 4.0, None, None).unwrap();
        assert_eq!(out.format(), PixelFormat::WORKING);
        assert_eq!((out.width(), out.height(), out.scale()), (12, 7, 1.0));
        assert!(out.data().chunks_exact(4).all(|p| p == GREY));
    }

    #[test]
    fn test_three_passes() {
        let conv = CountingBox { calls: Cell::new(0) };
        assert!(blur_with(&grey(5, 5, 1.0), &BlurOptions::new(3.0), &conv).is_some());
        assert_eq!(conv.calls.get(), BLUR_PASSES);
    }

    #[test]
    fn test_zero_scratch_aborts() {
        let err = try_blur_with(&grey(5, 5, 1.0), &BlurOptions::new(3.0), &NoScratch);
        assert!(matches!(err, Err(OpsError::ScratchSize { width: 5, height: 5 })));
    }

    #[test]
    fn test_crop_and_fallback() {
        let src = grey(10, 10, 1.0);
        let inside = BlurOptions::new(2.0).with_crop(LogicalRect::new(2.0, 3.0, 4.0, 5.0));
        let out = blur(&src, &inside).unwrap();
        assert_eq!((out.width(), out.height()), (4, 5));

        let outside = BlurOptions::new(2.0).with_crop(LogicalRect::new(50.0, 50.0, 4.0, 4.0));
        let out = blur(&src, &outside).unwrap();
        assert_eq!((out.width(), out.height()), (10, 10));
    }

    #[test]
    fn test_crop_in_logical_units() {
        let src = grey(20, 20, 2.0);
        let opts = BlurOptions::new(1.0).with_crop(LogicalRect::new(1.0, 1.0, 3.0, 2.0));
        let out = blur(&src, &opts).unwrap();
        assert_eq!((out.width(), out.height(), out.scale()), (6, 4, 2.0));
    }

    #[test]
    fn test_opaque_surface() {
        let clear = Bitmap::new(4, 4, PixelFormat::WORKING, 1.0).unwrap();
        let out = blur(&clear, &BlurOptions::new(2.0)).unwrap();
        assert!(out.data().chunks_exact(4).all(|p| p == [0, 0, 0, 255]));

        let out = blur(&clear, &BlurOptions::new(2.0).with_opaque(false)).unwrap();
        assert!(out.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_opaque_tint_covers() {
        let opts = BlurOptions::new(3.0).with_tint(Rgba::white());
        let out = blur(&grey(6, 6, 1.0), &opts).unwrap();
        assert!(out.data().iter().all(|&b| b == 255));
    }
}
