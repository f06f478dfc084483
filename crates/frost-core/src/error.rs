//! Error types for frost-core operations.
//!
//! The [`Error`] enum covers the failure modes of bitmap construction,
//! region extraction and format conversion.
//!
//! # Usage
//!
//! ```rust
//! use frost_core::{Error, Result};
//!
//! fn check_size(width: u32, height: u32) -> Result<()> {
//!     if width == 0 || height == 0 {
//!         return Err(Error::invalid_dimensions(width, height, "empty bitmap"));
//!     }
//!     Ok(())
//! }
//! assert!(check_size(0, 4).is_err());
//! ```
//!
//! # Used By
//!
//! - [`crate::bitmap::Bitmap`] - Buffer validation and cropping
//! - `frost-ops` - Wrapped into `OpsError`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or transforming bitmaps.
///
/// # Categories
///
/// - **Dimension errors**: [`InvalidDimensions`](Error::InvalidDimensions), [`BufferSize`](Error::BufferSize)
/// - **Region errors**: [`InvalidRegion`](Error::InvalidRegion)
/// - **Scale errors**: [`InvalidScale`](Error::InvalidScale)
/// - **Allocation errors**: [`AllocationFailed`](Error::AllocationFailed)
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid bitmap dimensions.
    ///
    /// Returned when width or height is zero, or when the byte size of
    /// the buffer would overflow `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Pixel buffer length doesn't match `width * height * 4`.
    #[error("buffer size mismatch: expected {expected} bytes, got {got}")]
    BufferSize {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        got: usize,
    },

    /// Scale factor is not a finite positive number.
    #[error("invalid scale factor: {0}")]
    InvalidScale(f64),

    /// Region does not overlap the bitmap.
    #[error("region ({rx}, {ry}, {rw}x{rh}) outside bitmap bounds {width}x{height}")]
    InvalidRegion {
        /// Region X origin
        rx: u32,
        /// Region Y origin
        ry: u32,
        /// Region width
        rw: u32,
        /// Region height
        rh: u32,
        /// Bitmap width
        width: u32,
        /// Bitmap height
        height: u32,
    },

    /// Memory allocation failed.
    ///
    /// Returned when a pixel buffer cannot be reserved. Very large bitmaps
    /// or runaway kernel sizes end up here instead of aborting the process.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(rx: u32, ry: u32, rw: u32, rh: u32, width: u32, height: u32) -> Self {
        Self::InvalidRegion {
            rx,
            ry,
            rw,
            rh,
            width,
            height,
        }
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }
}

/// Allocates a zeroed buffer of `len` elements without aborting on failure.
///
/// Uses [`Vec::try_reserve_exact`], so an impossible request becomes
/// [`Error::AllocationFailed`] instead of a process abort.
pub fn try_zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        Error::allocation_failed(len.saturating_mul(std::mem::size_of::<T>()), e.to_string())
    })?;
    buf.resize(len, T::default());
    Ok(buf)
}
