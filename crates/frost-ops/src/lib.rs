//! # frost-ops
//!
//! Box-blur, tint and crop filter for 32-bit bitmaps.
//!
//! Three box passes approximate a Gaussian blur. The result can be tinted
//! with a translucent color, and the source cropped to a logical
//! rectangle first.
//!
//! # Modules
//!
//! - [`blur`] - The filter pipeline and its options
//! - [`kernel`] - Radius to box-kernel sizing
//! - [`convolve`] - Box convolution capability and the sliding-window filter
//! - [`buffer`] - Working pixel buffers and the ping-pong pair
//! - [`surface`] - Output surface with an explicit transform
//! - [`composite`] - Premultiplied source-over
//! - [`parallel`] - Row-parallel per-pixel helpers
//!
//! # Example
//!
//! ```rust
//! use frost_core::{Bitmap, LogicalRect, PixelFormat, Rgba};
//! use frost_ops::blurred_image;
//!
//! let src = Bitmap::filled(64, 48, PixelFormat::Rgba8, 2.0, [30, 60, 90, 255]).unwrap();
//! let tint = Rgba::white().with_alpha(0.25);
//! let crop = LogicalRect::new(4.0, 4.0, 16.0, 12.0);
//!
//! let out = blurred_image(&src, 8.0, Some(tint), Some(crop)).unwrap();
//! assert_eq!((out.width(), out.height()), (32, 24));
//! ```
//!
//! # Failure
//!
//! The `Option` front-ends return `None` when there is nothing to blur or
//! memory runs out. Use [`blur::try_blur_with`] to see the [`OpsError`].
//!
//! # Feature Flags
//!
//! - `parallel` (default) - Row-parallel decode and fills via rayon
//! - `serde` - Serialization for [`BlurOptions`] and [`EdgeMode`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod blur;
pub mod buffer;
pub mod composite;
pub mod convolve;
pub mod kernel;
pub mod parallel;
pub mod surface;

pub use blur::{blur, blur_with, blurred_image, try_blur_with, BlurOptions};
pub use convolve::{BoxConvolve, EdgeMode, SlidingWindowBox};
pub use error::{OpsError, OpsResult};
pub use kernel::BoxKernel;
