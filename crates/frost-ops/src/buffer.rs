//! Working pixel buffers and the ping-pong pair used by the blur passes.
//!
//! A [`PixelBuffer`] is raw 4-channel, 8-bit pixel storage in the working
//! format. [`PingPong`] owns two of them and an index naming the one that
//! holds the latest result. Each pass reads the front and writes the back,
//! then [`PingPong::swap`] flips the index.
//!
//! ```rust
//! use frost_ops::buffer::{PingPong, PixelBuffer};
//!
//! let a = PixelBuffer::try_new(4, 4).unwrap();
//! let mut pp = PingPong::with_matching(a).unwrap();
//! for _ in 0..3 {
//!     let (_src, _dst) = pp.split();
//!     pp.swap();
//! }
//! assert_eq!(pp.front_index(), 1);
//! ```

use frost_core::{buffer_len, try_zeroed, Bitmap, PixelFormat};
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Raw working-format pixels, tightly packed and row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocates a zeroed buffer.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidDimensions`] for a zero-sized buffer, or an
    /// allocation failure wrapped in [`OpsError::Core`].
    pub fn try_new(width: u32, height: u32) -> OpsResult<Self> {
        if width == 0 || height == 0 {
            return Err(OpsError::InvalidDimensions(format!(
                "pixel buffer must be at least 1x1, got {width}x{height}"
            )));
        }
        let data = try_zeroed(buffer_len(width, height)?)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decodes a bitmap into the working format.
    pub fn from_bitmap(bitmap: &Bitmap) -> OpsResult<Self> {
        let mut buf = Self::try_new(bitmap.width(), bitmap.height())?;
        let src_format = bitmap.format();
        crate::parallel::for_each_pixel(
            &mut buf.data,
            bitmap.data(),
            buf.width as usize,
            |dst, src| {
                let px = src_format.convert(PixelFormat::WORKING, [src[0], src[1], src[2], src[3]]);
                dst.copy_from_slice(&px);
            },
        );
        Ok(buf)
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

    /// Bytes per row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * PixelFormat::BYTES_PER_PIXEL
    }

    /// Raw bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns `true` if both buffers have the same dimensions.
    #[inline]
    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Turns the buffer into a drawable bitmap in the working format.
    ///
    /// The pixel storage moves into the bitmap without copying.
    pub fn into_bitmap(self, scale: f64) -> OpsResult<Bitmap> {
        Bitmap::from_data(self.width, self.height, PixelFormat::WORKING, scale, self.data)
            .map_err(OpsError::Drawable)
    }
}

/// Two same-sized buffers with a flip-on-swap "latest" index.
#[derive(Debug)]
pub struct PingPong {
    buffers: [PixelBuffer; 2],
    front: usize,
}

impl PingPong {
    /// Pairs `front` with a freshly allocated buffer of the same size.
    pub fn with_matching(front: PixelBuffer) -> OpsResult<Self> {
        let back = PixelBuffer::try_new(front.width, front.height)?;
        Ok(Self {
            buffers: [front, back],
            front: 0,
        })
    }

    /// Index (0 or 1) of the buffer holding the latest result.
    #[inline]
    pub fn front_index(&self) -> usize {
        self.front
    }

    /// The buffer holding the latest result.
    #[inline]
    pub fn front(&self) -> &PixelBuffer {
        &self.buffers[self.front]
    }

    /// Latest result as source and the other buffer as destination.
    pub fn split(&mut self) -> (&PixelBuffer, &mut PixelBuffer) {
        let [a, b] = &mut self.buffers;
        if self.front == 0 { (&*a, b) } else { (&*b, a) }
    }

    /// Marks the destination of the last [`split`](Self::split) as latest.
    #[inline]
    pub fn swap(&mut self) {
        self.front ^= 1;
        trace!(front = self.front, "ping-pong swap");
    }

    /// Keeps the latest buffer and drops the other one.
    pub fn into_front(self) -> PixelBuffer {
        let [a, b] = self.buffers;
        if self.front == 0 { a } else { b }
    }
}
