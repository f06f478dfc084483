//! Owned bitmap buffer.
//!
//! A [`Bitmap`] is a tightly packed, row-major buffer of 4-byte pixels
//! plus the metadata needed to interpret it: the [`PixelFormat`] and a
//! scale factor (device pixels per logical unit).
//!
//! # Memory Layout
//!
//! ```text
//! Memory: [p00 p01 p02 ...]  <- Row 0 (top)
//!         [p10 p11 p12 ...]  <- Row 1
//!         ...
//! ```
//!
//! Each `pNN` is four bytes in the order given by the format.
//!
//! # Usage
//!
//! ```rust
//! use frost_core::{Bitmap, PixelFormat, Rect};
//!
//! let mut bmp = Bitmap::new(4, 4, PixelFormat::Rgba8, 2.0).unwrap();
//! bmp.set_pixel(1, 1, [255, 0, 0, 255]);
//! assert_eq!(bmp.logical_size(), (2.0, 2.0));
//!
//! let crop = bmp.crop(Rect::new(1, 1, 2, 2)).unwrap();
//! assert_eq!(crop.pixel(0, 0), [255, 0, 0, 255]);
//! ```

use crate::error::try_zeroed;
use crate::{Error, PixelFormat, Rect, Result};

/// Owned 32-bit-per-pixel image.
#[derive(Clone, PartialEq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    scale: f64,
}

/// Byte length of a `width x height` 4-channel buffer, or an error on overflow.
pub fn buffer_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(PixelFormat::BYTES_PER_PIXEL))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "byte size overflows usize"))
}

fn check_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidScale(scale))
    }
}

impl Bitmap {
    /// Creates a zeroed (transparent black) bitmap.
    ///
    /// Zero-sized bitmaps are allowed here; filters reject them later.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidScale`] if `scale` is not finite and positive,
    /// [`Error::AllocationFailed`] if the buffer cannot be reserved.
    pub fn new(width: u32, height: u32, format: PixelFormat, scale: f64) -> Result<Self> {
        check_scale(scale)?;
        let data = try_zeroed(buffer_len(width, height)?)?;
        Ok(Self {
            data,
            width,
            height,
            format,
            scale,
        })
    }

    /// Wraps an existing pixel buffer.
    ///
    /// # Errors
    ///
    /// [`Error::BufferSize`] if `data.len() != width * height * 4`.
    pub fn from_data(
        width: u32,
        height: u32,
        format: PixelFormat,
        scale: f64,
        data: Vec<u8>,
    ) -> Result<Self> {
        check_scale(scale)?;
        let expected = buffer_len(width, height)?;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format,
            scale,
        })
    }

    /// Creates a bitmap with every pixel set to `pixel`.
    pub fn filled(
        width: u32,
        height: u32,
        format: PixelFormat,
        scale: f64,
        pixel: [u8; 4],
    ) -> Result<Self> {
        let mut bmp = Self::new(width, height, format, scale)?;
        for px in bmp.data.chunks_exact_mut(4) {
            px.copy_from_slice(&pixel);
        }
        Ok(bmp)
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

    /// Pixel layout.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Device pixels per logical unit.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Size in logical units: `(width / scale, height / scale)`.
    #[inline]
    pub fn logical_size(&self) -> (f64, f64) {
        (
            self.width as f64 / self.scale,
            self.height as f64 / self.scale,
        )
    }

    /// The full-bitmap rectangle.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Raw bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes per row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * PixelFormat::BYTES_PER_PIXEL
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * PixelFormat::BYTES_PER_PIXEL
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&pixel);
    }

    /// Extracts a sub-region into a new bitmap with the same format and scale.
    ///
    /// The region is clipped to the bitmap bounds first. Returns `None` when
    /// nothing of the region lies inside the bitmap or the copy cannot be
    /// allocated. [`try_crop`](Self::try_crop) says which.
    pub fn crop(&self, region: Rect) -> Option<Bitmap> {
        self.try_crop(region).ok()
    }

    /// Like [`crop`](Self::crop) but reports why no bitmap was produced.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] if the region misses the bitmap,
    /// [`Error::AllocationFailed`] if the copy cannot be reserved.
    pub fn try_crop(&self, region: Rect) -> Result<Bitmap> {
        let r = self.bounds().intersect(&region).ok_or_else(|| {
            Error::invalid_region(
                region.x,
                region.y,
                region.width,
                region.height,
                self.width,
                self.height,
            )
        })?;
        let row_bytes = r.width as usize * PixelFormat::BYTES_PER_PIXEL;
        let mut data = try_zeroed::<u8>(row_bytes * r.height as usize)?;
        for (dst, y) in data.chunks_exact_mut(row_bytes).zip(r.y..r.bottom()) {
            let start = self.offset(r.x, y);
            dst.copy_from_slice(&self.data[start..start + row_bytes]);
        }
        Ok(Bitmap {
            data,
            width: r.width,
            height: r.height,
            format: self.format,
            scale: self.scale,
        })
    }

    /// Returns a copy converted to `format`.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailed`] if the copy cannot be reserved.
    pub fn to_format(&self, format: PixelFormat) -> Result<Bitmap> {
        let mut data = try_zeroed::<u8>(self.data.len())?;
        for (dst, src) in data.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
            let c = self.format.convert(format, [src[0], src[1], src[2], src[3]]);
            dst.copy_from_slice(&c);
        }
        Ok(Bitmap {
            data,
            width: self.width,
            height: self.height,
            format,
            scale: self.scale,
        })
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("scale", &self.scale)
            .finish()
    }
}
