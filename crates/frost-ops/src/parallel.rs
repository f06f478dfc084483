//! Row-parallel helpers for per-pixel stages.
//!
//! With the `parallel` feature, images of at least [`PARALLEL_THRESHOLD`]
//! pixels are split into rows and processed on the rayon pool. Smaller
//! images (and builds without the feature) run on the calling thread.
//!
//! Only stateless per-pixel work goes through here: format decode and
//! solid fills. The convolution passes share one scratch buffer and stay
//! sequential.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pixel count at which per-pixel stages go parallel.
pub const PARALLEL_THRESHOLD: usize = 256 * 256;

const BPP: usize = 4;

/// Calls `f(dst_px, src_px)` for every 4-byte pixel pair.
///
/// `dst` and `src` must have the same length, a multiple of
/// `width * 4`.
pub fn for_each_pixel<F>(dst: &mut [u8], src: &[u8], width: usize, f: F)
where
    F: Fn(&mut [u8], &[u8]) + Send + Sync,
{
    debug_assert_eq!(dst.len(), src.len());
    let row = (width * BPP).max(BPP);

    #[cfg(feature = "parallel")]
    if dst.len() / BPP >= PARALLEL_THRESHOLD {
        dst.par_chunks_mut(row)
            .zip(src.par_chunks(row))
            .for_each(|(d, s)| {
                for (dp, sp) in d.chunks_exact_mut(BPP).zip(s.chunks_exact(BPP)) {
                    f(dp, sp);
                }
            });
        return;
    }

    for (d, s) in dst.chunks_mut(row).zip(src.chunks(row)) {
        for (dp, sp) in d.chunks_exact_mut(BPP).zip(s.chunks_exact(BPP)) {
            f(dp, sp);
        }
    }
}

/// Calls `f(x, y, px)` for every pixel of a row-major buffer.
pub fn map_pixels<F>(data: &mut [u8], width: usize, f: F)
where
    F: Fn(usize, usize, &mut [u8]) + Send + Sync,
{
    let row = (width * BPP).max(BPP);
    let visit = |(y, r): (usize, &mut [u8])| {
        for (x, px) in r.chunks_exact_mut(BPP).enumerate() {
            f(x, y, px);
        }
    };

    #[cfg(feature = "parallel")]
    if data.len() / BPP >= PARALLEL_THRESHOLD {
        data.par_chunks_mut(row).enumerate().for_each(visit);
        return;
    }

    data.chunks_mut(row).enumerate().for_each(visit);
}
