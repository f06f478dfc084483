//! Rectangle types for crop regions.
//!
//! - [`Rect`] - Integral pixel rectangle
//! - [`LogicalRect`] - Rectangle in logical units (pixels divided by scale)
//!
//! # Coordinate System
//!
//! Both types use the standard image convention:
//! - Origin (0, 0) is at the **top-left** corner
//! - X increases to the right
//! - Y increases downward
//!
//! # Usage
//!
//! ```rust
//! use frost_core::{LogicalRect, Rect};
//!
//! // A 10x10 point crop on a 2x bitmap covers 20x20 pixels
//! let crop = LogicalRect::new(5.0, 5.0, 10.0, 10.0);
//! assert_eq!(crop.to_pixels(2.0), Some(Rect::new(10, 10, 20, 20)));
//! ```

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// All values are in pixels, with (0, 0) at the top-left corner.
/// A rectangle with zero width or height is empty.
///
/// # Example
///
/// ```rust
/// use frost_core::Rect;
///
/// let rect = Rect::new(10, 20, 100, 50);
/// assert_eq!(rect.right(), 110);
/// assert_eq!(rect.bottom(), 70);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: u32,
    /// Y coordinate of the top edge (inclusive)
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from origin (0, 0) with given dimensions.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// X coordinate of the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Y coordinate of the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Computes the intersection of two rectangles.
    ///
    /// Returns `None` if they don't overlap.
    ///
    /// # Example
    ///
    /// ```rust
    /// use frost_core::Rect;
    ///
    /// let a = Rect::new(0, 0, 100, 100);
    /// let b = Rect::new(50, 50, 100, 100);
    /// assert_eq!(a.intersect(&b), Some(Rect::new(50, 50, 50, 50)));
    /// ```
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

/// A rectangle in logical units.
///
/// Logical units are device pixels divided by the bitmap's scale factor.
/// Negative sizes are normalized, so `(10, 10, -5, -5)` covers the same
/// area as `(5, 5, 5, 5)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogicalRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width (may be negative before normalization)
    pub width: f64,
    /// Height (may be negative before normalization)
    pub height: f64,
}

impl LogicalRect {
    /// Creates a new logical rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Returns the rectangle with non-negative width and height.
    pub fn standardized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    /// Converts to device pixels at the given scale.
    ///
    /// Edges are rounded outward to whole pixels and clipped at zero.
    /// Returns `None` for non-finite input or when nothing remains in
    /// the positive quadrant.
    ///
    /// # Example
    ///
    /// ```rust
    /// use frost_core::{LogicalRect, Rect};
    ///
    /// let r = LogicalRect::new(0.5, 0.5, 1.0, 1.0);
    /// assert_eq!(r.to_pixels(1.0), Some(Rect::new(0, 0, 2, 2)));
    /// ```
    pub fn to_pixels(&self, scale: f64) -> Option<Rect> {
        let r = self.standardized();
        let edges = [
            r.x * scale,
            r.y * scale,
            (r.x + r.width) * scale,
            (r.y + r.height) * scale,
        ];
        if edges.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let max = u32::MAX as f64;
        let left = edges[0].floor().clamp(0.0, max);
        let top = edges[1].floor().clamp(0.0, max);
        let right = edges[2].ceil().clamp(0.0, max);
        let bottom = edges[3].ceil().clamp(0.0, max);

        let rect = Rect::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        );
        (!rect.is_empty()).then_some(rect)
    }
}
