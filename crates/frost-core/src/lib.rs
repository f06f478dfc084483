//! # frost-core
//!
//! Core types for the frost blur filter.
//!
//! - [`Bitmap`] - Owned 32-bit-per-pixel image with a scale factor
//! - [`PixelFormat`] - Byte order and alpha mode of a pixel
//! - [`Rect`], [`LogicalRect`] - Pixel and logical-unit rectangles
//! - [`Rgba`] - Straight-alpha color used for tints
//! - [`Error`], [`Result`] - Error handling
//!
//! ## Crate Structure
//!
//! ```text
//! frost-core (this crate)
//!    ^
//!    |
//!    +-- frost-ops (convolution, compositing, blur pipeline)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialization for [`Rect`], [`LogicalRect`] and [`Rgba`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bitmap;
pub mod error;
pub mod pixel;
pub mod rect;

pub use bitmap::{buffer_len, Bitmap};
pub use error::{try_zeroed, Error, Result};
pub use pixel::{premultiply, unpremultiply, PixelFormat, Rgba};
pub use rect::{LogicalRect, Rect};

/// Prelude module for convenient imports.
///
/// ```
/// use frost_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bitmap::Bitmap;
    pub use crate::error::{Error, Result};
    pub use crate::pixel::{PixelFormat, Rgba};
    pub use crate::rect::{LogicalRect, Rect};
}
