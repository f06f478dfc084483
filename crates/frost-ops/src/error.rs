//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
///
/// Every variant maps to "no result" in the `Option` front-ends of
/// [`crate::blur`]; the variant only records why.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Source is smaller than one logical unit in either direction.
    #[error("degenerate source size: {width}x{height} logical units")]
    DegenerateSize {
        /// Logical width
        width: f64,
        /// Logical height
        height: f64,
    },

    /// Blur radius is below the smallest positive value or not finite.
    #[error("degenerate blur radius: {0}")]
    DegenerateRadius(f64),

    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Buffers have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Convolution reported a non-positive scratch requirement.
    #[error("convolution needs no scratch memory for {width}x{height}, refusing to run")]
    ScratchSize {
        /// Buffer width
        width: u32,
        /// Buffer height
        height: u32,
    },

    /// Blurred buffer could not be turned into a drawable bitmap.
    #[error("drawable conversion failed: {0}")]
    Drawable(#[source] frost_core::Error),

    /// Output surface could not be created.
    #[error("output surface unavailable: {0}")]
    Surface(#[source] frost_core::Error),

    /// Bitmap construction, decode or allocation failure.
    #[error(transparent)]
    Core(#[from] frost_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
