//! Output drawing surface with an explicit coordinate transform.
//!
//! A [`Surface`] is a working-format pixel buffer plus a small graphics
//! state: the current transform (CTM) from user space to device pixels
//! and a fill color. States can be saved and restored.
//!
//! # Coordinate Systems
//!
//! ```text
//! device: pixels, origin top-left, y down
//! user:   logical units; base CTM = scale(s, s), still y down
//! images: drawn with row 0 at the *top of the rect in y-up terms*,
//!         i.e. at the largest user y
//! ```
//!
//! Because images follow the y-up convention, drawing into the base
//! y-down space shows them upside down. Concatenating
//! [`Transform::flip_vertical`] first turns user space y-up, and the
//! image lands right side up:
//!
//! ```rust
//! use frost_core::{Bitmap, LogicalRect, PixelFormat};
//! use frost_ops::surface::{Surface, Transform};
//!
//! let mut img = Bitmap::new(1, 2, PixelFormat::WORKING, 1.0).unwrap();
//! img.set_pixel(0, 0, [255, 255, 255, 255]);
//!
//! let mut s = Surface::try_new(1, 2, 1.0, true).unwrap();
//! s.concat(Transform::flip_vertical(2.0));
//! s.draw_image(&img, LogicalRect::from_size(1.0, 2.0)).unwrap();
//! let out = s.into_bitmap().unwrap();
//! assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);
//! ```

use frost_core::{buffer_len, try_zeroed, Bitmap, Error, LogicalRect, PixelFormat, Rgba};
use tracing::trace;

use crate::composite::over_in_place;
use crate::parallel::map_pixels;
use crate::{OpsError, OpsResult};

/// Axis-aligned affine transform: `(x, y) -> (sx*x + tx, sy*y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// X scale
    pub sx: f64,
    /// Y scale
    pub sy: f64,
    /// X translation
    pub tx: f64,
    /// Y translation
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub const fn identity() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Pure scale.
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self {
            sx,
            sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Pure translation.
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx,
            ty,
        }
    }

    /// Mirror about the horizontal center line of a `height`-tall area.
    ///
    /// Same as `scale(1, -1)` followed by `translate(0, -height)` in
    /// concat order: maps `y` to `height - y`.
    pub const fn flip_vertical(height: f64) -> Self {
        Self {
            sx: 1.0,
            sy: -1.0,
            tx: 0.0,
            ty: height,
        }
    }

    /// Transform that applies `inner` first, then `self`.
    pub fn concat(&self, inner: &Transform) -> Transform {
        Transform {
            sx: self.sx * inner.sx,
            sy: self.sy * inner.sy,
            tx: self.sx * inner.tx + self.tx,
            ty: self.sy * inner.ty + self.ty,
        }
    }

    /// Maps a point.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.sx * x + self.tx, self.sy * y + self.ty)
    }

    /// Inverse transform, or `None` if a scale is zero or not finite.
    pub fn invert(&self) -> Option<Transform> {
        if self.sx == 0.0 || self.sy == 0.0 || !self.sx.is_finite() || !self.sy.is_finite() {
            return None;
        }
        Some(Transform {
            sx: 1.0 / self.sx,
            sy: 1.0 / self.sy,
            tx: -self.tx / self.sx,
            ty: -self.ty / self.sy,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Transform,
    fill: Rgba,
}

/// Pixel target for compositing, in the working format.
#[derive(Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    scale: f64,
    data: Vec<u8>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
}

/// Device pixel span `[start, end)` whose centers fall in `[lo, hi)`.
fn pixel_span(lo: f64, hi: f64, limit: u32) -> (u32, u32) {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let start = (lo - 0.5).ceil().clamp(0.0, limit as f64) as u32;
    let end = (hi - 0.5).ceil().clamp(0.0, limit as f64) as u32;
    (start, end)
}

impl Surface {
    /// Creates a `width x height` pixel surface.
    ///
    /// An opaque surface starts as opaque black and stays opaque under
    /// source-over. Otherwise it starts fully transparent.
    ///
    /// # Errors
    ///
    /// [`OpsError::Surface`] for an empty size, a bad scale or a failed
    /// allocation.
    pub fn try_new(width: u32, height: u32, scale: f64, opaque: bool) -> OpsResult<Self> {
        if width == 0 || height == 0 {
            return Err(OpsError::Surface(Error::invalid_dimensions(
                width,
                height,
                "surface must be at least 1x1",
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(OpsError::Surface(Error::InvalidScale(scale)));
        }
        let len = buffer_len(width, height).map_err(OpsError::Surface)?;
        let mut data = try_zeroed::<u8>(len).map_err(OpsError::Surface)?;
        if opaque {
            for px in data.chunks_exact_mut(4) {
                px[3] = 255;
            }
        }
        Ok(Self {
            width,
            height,
            scale,
            data,
            state: GraphicsState {
                ctm: Transform::scale(scale, scale),
                fill: Rgba::black(),
            },
            saved: Vec::new(),
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size in logical units.
    #[inline]
    pub fn logical_size(&self) -> (f64, f64) {
        (
            self.width as f64 / self.scale,
            self.height as f64 / self.scale,
        )
    }

    /// Current transform from user space to device pixels.
    #[inline]
    pub fn ctm(&self) -> Transform {
        self.state.ctm
    }

    /// Pushes the graphics state.
    pub fn save_state(&mut self) {
        self.saved.push(self.state);
    }

    /// Pops the graphics state. Returns `false` if nothing was saved.
    pub fn restore_state(&mut self) -> bool {
        match self.saved.pop() {
            Some(s) => {
                self.state = s;
                true
            }
            None => false,
        }
    }

    /// Applies `t` to user space before the current transform.
    pub fn concat(&mut self, t: Transform) {
        self.state.ctm = self.state.ctm.concat(&t);
    }

    /// Sets the color used by [`fill_rect`](Self::fill_rect).
    pub fn set_fill_color(&mut self, color: Rgba) {
        self.state.fill = color;
    }

    /// Fills `rect` (user space) with the fill color using source-over.
    pub fn fill_rect(&mut self, rect: LogicalRect) {
        let r = rect.standardized();
        let ctm = self.state.ctm;
        let (x0, y0) = ctm.apply(r.x, r.y);
        let (x1, y1) = ctm.apply(r.x + r.width, r.y + r.height);
        let (cx0, cx1) = pixel_span(x0, x1, self.width);
        let (cy0, cy1) = pixel_span(y0, y1, self.height);
        if cx0 >= cx1 || cy0 >= cy1 {
            return;
        }
        let color = self.state.fill.to_pixel(PixelFormat::WORKING);
        trace!(cx0, cy0, cx1, cy1, ?color, "fill rect");

        map_pixels(&mut self.data, self.width as usize, |x, y, px| {
            let (x, y) = (x as u32, y as u32);
            if x >= cx0 && x < cx1 && y >= cy0 && y < cy1 {
                over_in_place(color, px);
            }
        });
    }

    /// Draws `image` into `rect` (user space) using source-over.
    ///
    /// The image is sampled nearest-neighbour at device pixel centers.
    /// Row 0 of the image maps to the largest user y of `rect`.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] if the current transform collapses an
    /// axis and cannot be inverted. Fails with an allocation error if the
    /// image has to be converted to the working format and that copy
    /// cannot be reserved.
    pub fn draw_image(&mut self, image: &Bitmap, rect: LogicalRect) -> OpsResult<()> {
        let r = rect.standardized();
        let Some(inv) = self.state.ctm.invert() else {
            return Err(OpsError::InvalidParameter(format!(
                "transform {:?} is not invertible",
                self.state.ctm
            )));
        };
        if image.width() == 0 || image.height() == 0 || r.width <= 0.0 || r.height <= 0.0 {
            return Ok(());
        }

        let converted;
        let image = if image.format() == PixelFormat::WORKING {
            image
        } else {
            converted = image.to_format(PixelFormat::WORKING)?;
            &converted
        };
        let (iw, ih) = (image.width(), image.height());
        trace!(iw, ih, ?r, ctm = ?self.state.ctm, "draw image");

        map_pixels(&mut self.data, self.width as usize, |x, y, px| {
            let (ux, uy) = inv.apply(x as f64 + 0.5, y as f64 + 0.5);
            let u = (ux - r.x) / r.width;
            let v = (uy - r.y) / r.height;
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                return;
            }
            let col = ((u * iw as f64) as u32).min(iw - 1);
            let from_bottom = ((v * ih as f64) as u32).min(ih - 1);
            over_in_place(image.pixel(col, ih - 1 - from_bottom), px);
        });
        Ok(())
    }

    /// Consumes the surface, returning its pixels as a working-format bitmap.
    pub fn into_bitmap(self) -> OpsResult<Bitmap> {
        Bitmap::from_data(self.width, self.height, PixelFormat::WORKING, self.scale, self.data)
            .map_err(OpsError::Surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(top: [u8; 4], bottom: [u8; 4]) -> Bitmap {
        let mut img = Bitmap::new(1, 2, PixelFormat::WORKING, 1.0).unwrap();
        img.set_pixel(0, 0, top);
        img.set_pixel(0, 1, bottom);
        img
    }

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const RED: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn test_transform_concat_order() {
        // scale then translate in concat order: translate applies first
        let t = Transform::scale(1.0, -1.0).concat(&Transform::translate(0.0, -10.0));
        assert_eq!(t, Transform::flip_vertical(10.0));
        let (x, y) = t.apply(3.0, 0.0);
        assert_relative_eq!(x, 3.0);
        assert_relative_eq!(y, 10.0);
    }

    #[test]
    fn test_transform_invert() {
        let t = Transform::scale(2.0, 2.0).concat(&Transform::flip_vertical(5.0));
        let inv = t.invert().unwrap();
        let (x, y) = t.apply(1.25, 4.0);
        let (bx, by) = inv.apply(x, y);
        assert_relative_eq!(bx, 1.25);
        assert_relative_eq!(by, 4.0);
        assert!(Transform::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_new_opaque_and_transparent() {
        let s = Surface::try_new(2, 2, 1.0, true).unwrap();
        let b = s.into_bitmap().unwrap();
        assert_eq!(b.pixel(1, 1), [0, 0, 0, 255]);

        let s = Surface::try_new(2, 2, 1.0, false).unwrap();
        assert_eq!(s.into_bitmap().unwrap().pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_new_rejects_empty_and_bad_scale() {
        assert!(matches!(Surface::try_new(0, 1, 1.0, true), Err(OpsError::Surface(_))));
        assert!(matches!(Surface::try_new(1, 1, -1.0, true), Err(OpsError::Surface(_))));
    }

    #[test]
    fn test_draw_without_flip_is_upside_down() {
        let mut s = Surface::try_new(1, 2, 1.0, true).unwrap();
        s.draw_image(&column(WHITE, RED), LogicalRect::from_size(1.0, 2.0)).unwrap();
        let out = s.into_bitmap().unwrap();
        assert_eq!(out.pixel(0, 0), RED);
        assert_eq!(out.pixel(0, 1), WHITE);
    }

    #[test]
    fn test_draw_with_flip_is_upright_at_scale() {
        // 2x2 pixels at 2x is one logical unit
        let mut img = Bitmap::new(2, 2, PixelFormat::WORKING, 2.0).unwrap();
        img.set_pixel(0, 0, WHITE);
        img.set_pixel(1, 1, RED);
        let mut s = Surface::try_new(2, 2, 2.0, true).unwrap();
        let (w, h) = s.logical_size();
        s.save_state();
        s.concat(Transform::flip_vertical(h));
        s.draw_image(&img, LogicalRect::from_size(w, h)).unwrap();
        assert!(s.restore_state());
        assert_eq!(s.ctm(), Transform::scale(2.0, 2.0));

        let out = s.into_bitmap().unwrap();
        assert_eq!(out.pixel(0, 0), WHITE);
        assert_eq!(out.pixel(1, 1), RED);
        assert_eq!(out.pixel(1, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_draw_converts_format() {
        let img = Bitmap::filled(1, 1, PixelFormat::Rgba8, 1.0, [255, 0, 0, 255]).unwrap();
        let mut s = Surface::try_new(1, 1, 1.0, false).unwrap();
        s.draw_image(&img, LogicalRect::from_size(1.0, 1.0)).unwrap();
        assert_eq!(s.into_bitmap().unwrap().pixel(0, 0), RED);
    }

    #[test]
    fn test_fill_rect_source_over() {
        let mut s = Surface::try_new(2, 1, 1.0, true).unwrap();
        s.set_fill_color(Rgba::new(1.0, 1.0, 1.0, 0.5));
        s.fill_rect(LogicalRect::from_size(1.0, 1.0));
        let out = s.into_bitmap().unwrap();
        assert_eq!(out.pixel(0, 0), [128, 128, 128, 255]);
        assert_eq!(out.pixel(1, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_fill_rect_under_flip_covers_same_area() {
        let mut s = Surface::try_new(3, 3, 1.0, false).unwrap();
        s.concat(Transform::flip_vertical(3.0));
        s.set_fill_color(Rgba::white());
        s.fill_rect(LogicalRect::new(0.0, 0.0, 3.0, 1.0));
        let out = s.into_bitmap().unwrap();
        // y-up user row 0 is the bottom device row
        assert_eq!(out.pixel(1, 2), WHITE);
        assert_eq!(out.pixel(1, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_draw_with_singular_transform_fails() {
        let mut s = Surface::try_new(2, 2, 1.0, true).unwrap();
        s.concat(Transform::scale(0.0, 1.0));
        let img = column(WHITE, RED);
        let err = s.draw_image(&img, LogicalRect::from_size(1.0, 2.0));
        assert!(matches!(err, Err(OpsError::InvalidParameter(_))));
        // nothing was drawn
        let out = s.into_bitmap().unwrap();
        assert!(out.data().chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_restore_without_save() {
        let mut s = Surface::try_new(1, 1, 1.0, true).unwrap();
        assert!(!s.restore_state());
    }

    #[test]
    fn test_pixel_span() {
        assert_eq!(pixel_span(0.0, 3.0, 10), (0, 3));
        assert_eq!(pixel_span(3.0, 0.0, 10), (0, 3));
        assert_eq!(pixel_span(0.6, 1.4, 10), (1, 1));
        assert_eq!(pixel_span(-5.0, 50.0, 10), (0, 10));
    }
}
