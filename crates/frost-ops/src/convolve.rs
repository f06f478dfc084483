//! Box convolution.
//!
//! [`BoxConvolve`] is the capability the blur pipeline needs: average each
//! pixel over a `kernel_w x kernel_h` window, reading `src` and writing
//! `dst`, with caller-provided scratch memory. [`SlidingWindowBox`] is the
//! built-in implementation.
//!
//! # Algorithm
//!
//! The box is separable, so one 2D pass is a vertical pass followed by a
//! horizontal pass. Each pass keeps a running sum: the window moves by
//! subtracting the sample that leaves and adding the one that enters, so
//! the cost per pixel does not depend on the kernel size.
//!
//! ```text
//! vertical:   src --(row accumulator)--> dst
//! horizontal: dst --(copied line)------> dst   (in place)
//! ```
//!
//! Both the row accumulator and the copied line live in scratch, which is
//! why [`SlidingWindowBox::scratch_len`] is `8 * width` words.
//!
//! # Example
//!
//! ```rust
//! use frost_ops::buffer::PixelBuffer;
//! use frost_ops::convolve::{BoxConvolve, EdgeMode, SlidingWindowBox};
//!
//! let src = PixelBuffer::try_new(8, 8).unwrap();
//! let mut dst = PixelBuffer::try_new(8, 8).unwrap();
//! let conv = SlidingWindowBox;
//! let mut scratch = vec![0u64; conv.scratch_len(8, 8, 3, 3)];
//! conv.convolve(&src, &mut dst, &mut scratch, 3, 3, EdgeMode::Extend).unwrap();
//! ```

use tracing::trace;

use crate::buffer::PixelBuffer;
use crate::{OpsError, OpsResult};

const BPP: usize = 4;

/// How samples outside the buffer are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeMode {
    /// Out-of-bounds samples repeat the nearest edge pixel.
    #[default]
    Extend,
    /// Out-of-bounds samples take this working-format pixel.
    Background([u8; 4]),
    /// Out-of-bounds samples are dropped and the average is taken over
    /// the in-bounds part of the window.
    Truncate,
}

/// Where a window position reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tap {
    Pixel(usize),
    Fill,
    Skip,
}

impl EdgeMode {
    fn tap(self, i: isize, len: usize) -> Tap {
        if i >= 0 && (i as usize) < len {
            return Tap::Pixel(i as usize);
        }
        match self {
            Self::Extend => Tap::Pixel(if i < 0 { 0 } else { len - 1 }),
            Self::Background(_) => Tap::Fill,
            Self::Truncate => Tap::Skip,
        }
    }

    fn fill(self) -> [u8; 4] {
        match self {
            Self::Background(px) => px,
            _ => [0; 4],
        }
    }

    /// Divisor for the window centered at `center`.
    fn window_count(self, center: usize, half: usize, len: usize) -> u64 {
        match self {
            Self::Truncate => {
                let lo = center.saturating_sub(half);
                let hi = (center + half).min(len - 1);
                (hi - lo + 1) as u64
            }
            _ => (2 * half + 1) as u64,
        }
    }
}

/// A box-filter implementation usable by the blur pipeline.
pub trait BoxConvolve {
    /// Scratch words [`convolve`](Self::convolve) needs for these sizes.
    ///
    /// Zero means the convolution cannot run (empty buffer).
    fn scratch_len(&self, width: u32, height: u32, kernel_w: u32, kernel_h: u32) -> usize;

    /// Box-filters `src` into `dst`.
    ///
    /// Kernel sizes must be odd. `scratch` must hold at least
    /// [`scratch_len`](Self::scratch_len) words; its contents on entry
    /// are ignored.
    fn convolve(
        &self,
        src: &PixelBuffer,
        dst: &mut PixelBuffer,
        scratch: &mut [u64],
        kernel_w: u32,
        kernel_h: u32,
        edge: EdgeMode,
    ) -> OpsResult<()>;
}

/// Separable running-sum box filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlidingWindowBox;

impl BoxConvolve for SlidingWindowBox {
    fn scratch_len(&self, width: u32, height: u32, _kernel_w: u32, _kernel_h: u32) -> usize {
        if width == 0 || height == 0 {
            return 0;
        }
        // row accumulator + copied line
        2 * width as usize * BPP
    }

    fn convolve(
        &self,
        src: &PixelBuffer,
        dst: &mut PixelBuffer,
        scratch: &mut [u64],
        kernel_w: u32,
        kernel_h: u32,
        edge: EdgeMode,
    ) -> OpsResult<()> {
        if kernel_w % 2 == 0 || kernel_h % 2 == 0 {
            return Err(OpsError::InvalidParameter(format!(
                "kernel dimensions must be odd, got {kernel_w}x{kernel_h}"
            )));
        }
        if !src.same_size(dst) {
            return Err(OpsError::SizeMismatch(format!(
                "src {}x{} vs dst {}x{}",
                src.width(),
                src.height(),
                dst.width(),
                dst.height()
            )));
        }
        let (width, height) = (src.width(), src.height());
        let needed = self.scratch_len(width, height, kernel_w, kernel_h);
        if needed == 0 {
            return Err(OpsError::ScratchSize { width, height });
        }
        if scratch.len() < needed {
            return Err(OpsError::SizeMismatch(format!(
                "scratch holds {} words, need {needed}",
                scratch.len()
            )));
        }
        trace!(width, height, kernel_w, kernel_h, ?edge, "box convolve");

        let (acc, line) = scratch[..needed].split_at_mut(needed / 2);
        let (w, h) = (width as usize, height as usize);
        vertical_pass(src.data(), dst.data_mut(), w, h, (kernel_h / 2) as usize, edge, acc);
        horizontal_pass(dst.data_mut(), w, (kernel_w / 2) as usize, edge, line);
        Ok(())
    }
}

/// Adds (or removes) `weight` copies of a tap to the accumulator.
#[inline]
fn apply_tap(acc: &mut [u64], source: &[u64], tap: Tap, fill: [u8; 4], weight: u64, add: bool) {
    let stride = acc.len();
    match tap {
        Tap::Pixel(i) => {
            let s = &source[i * stride..(i + 1) * stride];
            for (a, &v) in acc.iter_mut().zip(s) {
                if add { *a += v * weight } else { *a -= v * weight }
            }
        }
        Tap::Fill => {
            for (c, a) in acc.iter_mut().enumerate() {
                let v = fill[c % BPP] as u64;
                if add { *a += v * weight } else { *a -= v * weight }
            }
        }
        Tap::Skip => {}
    }
}

/// Same as [`apply_tap`] for byte sources.
#[inline]
fn apply_tap_u8(acc: &mut [u64], source: &[u8], tap: Tap, fill: [u8; 4], weight: u64, add: bool) {
    let stride = acc.len();
    match tap {
        Tap::Pixel(i) => {
            let s = &source[i * stride..(i + 1) * stride];
            for (a, &v) in acc.iter_mut().zip(s) {
                if add { *a += v as u64 * weight } else { *a -= v as u64 * weight }
            }
        }
        Tap::Fill => {
            for (c, a) in acc.iter_mut().enumerate() {
                let v = fill[c % BPP] as u64;
                if add { *a += v * weight } else { *a -= v * weight }
            }
        }
        Tap::Skip => {}
    }
}

/// Taps covering window `[-half, half]` around position 0, with counts.
///
/// Out-of-range positions collapse onto `tap(-1)` and `tap(len)`, so the
/// initial window costs O(min(half, len)) taps instead of O(half).
fn initial_taps(edge: EdgeMode, half: usize, len: usize) -> impl Iterator<Item = (Tap, u64)> {
    let inside = half.min(len - 1);
    let above = half.saturating_sub(len - 1) as u64;
    std::iter::once((edge.tap(-1, len), half as u64))
        .chain((0..=inside).map(|i| (Tap::Pixel(i), 1)))
        .chain(std::iter::once((edge.tap(len as isize, len), above)))
        .filter(|&(_, n)| n > 0)
}

#[inline]
fn average(sum: u64, n: u64) -> u8 {
    ((sum + n / 2) / n).min(255) as u8
}

fn vertical_pass(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    half: usize,
    edge: EdgeMode,
    acc: &mut [u64],
) {
    let row = width * BPP;
    let fill = edge.fill();
    acc.fill(0);
    for (tap, n) in initial_taps(edge, half, height) {
        apply_tap_u8(acc, src, tap, fill, n, true);
    }

    for (y, out) in dst.chunks_exact_mut(row).enumerate() {
        let n = edge.window_count(y, half, height);
        for (o, &a) in out.iter_mut().zip(acc.iter()) {
            *o = average(a, n);
        }
        let leaving = edge.tap(y as isize - half as isize, height);
        let entering = edge.tap(y as isize + half as isize + 1, height);
        apply_tap_u8(acc, src, leaving, fill, 1, false);
        apply_tap_u8(acc, src, entering, fill, 1, true);
    }
}

fn horizontal_pass(
    data: &mut [u8],
    width: usize,
    half: usize,
    edge: EdgeMode,
    line: &mut [u64],
) {
    let row = width * BPP;
    let fill = edge.fill();

    for out in data.chunks_exact_mut(row) {
        for (l, &v) in line.iter_mut().zip(out.iter()) {
            *l = v as u64;
        }

        let mut acc = [0u64; BPP];
        for (tap, n) in initial_taps(edge, half, width) {
            apply_tap(&mut acc, line, tap, fill, n, true);
        }

        for (x, px) in out.chunks_exact_mut(BPP).enumerate() {
            let n = edge.window_count(x, half, width);
            for (o, &a) in px.iter_mut().zip(acc.iter()) {
                *o = average(a, n);
            }
            let leaving = edge.tap(x as isize - half as isize, width);
            let entering = edge.tap(x as isize + half as isize + 1, width);
            apply_tap(&mut acc, line, leaving, fill, 1, false);
            apply_tap(&mut acc, line, entering, fill, 1, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u32, height: u32, pixels: &[[u8; 4]]) -> PixelBuffer {
        let mut b = PixelBuffer::try_new(width, height).unwrap();
        for (dst, px) in b.data_mut().chunks_exact_mut(4).zip(pixels) {
            dst.copy_from_slice(px);
        }
        b
    }

    fn run(src: &PixelBuffer, kw: u32, kh: u32, edge: EdgeMode) -> PixelBuffer {
        let conv = SlidingWindowBox;
        let mut dst = PixelBuffer::try_new(src.width(), src.height()).unwrap();
        let mut scratch = vec![0u64; conv.scratch_len(src.width(), src.height(), kw, kh)];
        conv.convolve(src, &mut dst, &mut scratch, kw, kh, edge).unwrap();
        dst
    }

    /// Direct O(k^2) box average for comparison.
    fn reference(src: &PixelBuffer, kw: u32, kh: u32, edge: EdgeMode) -> Vec<u8> {
        let (w, h) = (src.width() as isize, src.height() as isize);
        let (hx, hy) = ((kw / 2) as isize, (kh / 2) as isize);
        let mut out = vec![0u8; src.data().len()];
        for y in 0..h {
            for x in 0..w {
                let mut sum = [0u64; 4];
                let mut n = 0u64;
                for dy in -hy..=hy {
                    for dx in -hx..=hx {
                        let (sx, sy) = (x + dx, y + dy);
                        let inside = sx >= 0 && sx < w && sy >= 0 && sy < h;
                        let px = match (inside, edge) {
                            (true, _) | (false, EdgeMode::Extend) => {
                                let cx = sx.clamp(0, w - 1) as usize;
                                let cy = sy.clamp(0, h - 1) as usize;
                                let i = (cy * w as usize + cx) * 4;
                                let d = src.data();
                                [d[i], d[i + 1], d[i + 2], d[i + 3]]
                            }
                            (false, EdgeMode::Background(p)) => p,
                            (false, EdgeMode::Truncate) => continue,
                        };
                        for c in 0..4 {
                            sum[c] += px[c] as u64;
                        }
                        n += 1;
                    }
                }
                let i = ((y * w + x) * 4) as usize;
                for c in 0..4 {
                    out[i + c] = ((sum[c] as f64 / n as f64).round()) as u8;
                }
            }
        }
        out
    }

    fn pattern(width: u32, height: u32) -> PixelBuffer {
        let pixels: Vec<[u8; 4]> = (0..width * height)
            .map(|i| {
                let v = (i * 37 % 256) as u8;
                [v, v / 2, 255 - v, 255]
            })
            .collect();
        buffer(width, height, &pixels)
    }

    #[test]
    fn test_constant_stays_constant() {
        let src = buffer(5, 4, &[[40, 80, 120, 255]; 20]);
        for edge in [EdgeMode::Extend, EdgeMode::Truncate] {
            let out = run(&src, 3, 3, edge);
            assert!(out.data().chunks_exact(4).all(|p| p == [40, 80, 120, 255]));
        }
    }

    #[test]
    fn test_identity_kernel() {
        let src = pattern(7, 5);
        let out = run(&src, 1, 1, EdgeMode::Extend);
        assert_eq!(out.data(), src.data());
    }

    #[test]
    fn test_single_row_extend() {
        // [0, 90, 180] with k=3: x0 = (0+0+90)/3, x1 = 270/3, x2 = (90+180+180)/3
        let src = buffer(3, 1, &[[0; 4], [90; 4], [180; 4]]);
        let out = run(&src, 3, 1, EdgeMode::Extend);
        let firsts: Vec<u8> = out.data().chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(firsts, vec![30, 90, 150]);
    }

    #[test]
    fn test_background_fill() {
        let src = buffer(1, 1, &[[90, 90, 90, 90]]);
        let out = run(&src, 3, 1, EdgeMode::Background([0, 0, 0, 0]));
        assert_eq!(&out.data()[..4], &[30, 30, 30, 30]);
    }

    #[test]
    fn test_truncate_uses_in_bounds_only() {
        let src = buffer(3, 1, &[[0; 4], [90; 4], [180; 4]]);
        let out = run(&src, 3, 1, EdgeMode::Truncate);
        let firsts: Vec<u8> = out.data().chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(firsts, vec![45, 90, 135]);
    }

    #[test]
    fn test_vertical_only() {
        let src = buffer(1, 3, &[[0; 4], [90; 4], [180; 4]]);
        let out = run(&src, 1, 3, EdgeMode::Extend);
        let firsts: Vec<u8> = out.data().chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(firsts, vec![30, 90, 150]);
    }

    #[test]
    fn test_kernel_larger_than_image() {
        let src = buffer(2, 1, &[[0; 4], [100; 4]]);
        // k=7 extend: x0 window = 4x0 + 3x100 = 300/7 ~ 43
        let out = run(&src, 7, 1, EdgeMode::Extend);
        assert_eq!(out.data()[0], 43);
        assert_eq!(out.data()[4], 57);
    }

    #[test]
    fn test_matches_reference_within_rounding() {
        let src = pattern(13, 9);
        for edge in [EdgeMode::Extend, EdgeMode::Background([10, 20, 30, 40]), EdgeMode::Truncate] {
            for (kw, kh) in [(3, 3), (5, 3), (1, 7), (9, 9)] {
                let out = run(&src, kw, kh, edge);
                let expected = reference(&src, kw, kh, edge);
                for (a, b) in out.data().iter().zip(&expected) {
                    // two rounded 1D passes vs one exact 2D average
                    assert!((*a as i32 - *b as i32).abs() <= 1, "{edge:?} {kw}x{kh}");
                }
            }
        }
    }

    #[test]
    fn test_even_kernel_rejected() {
        let src = pattern(4, 4);
        let mut dst = PixelBuffer::try_new(4, 4).unwrap();
        let mut scratch = vec![0u64; 64];
        let err = SlidingWindowBox
            .convolve(&src, &mut dst, &mut scratch, 4, 3, EdgeMode::Extend)
            .unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));
    }

    #[test]
    fn test_size_mismatch() {
        let src = pattern(4, 4);
        let mut dst = PixelBuffer::try_new(4, 5).unwrap();
        let mut scratch = vec![0u64; 64];
        let err = SlidingWindowBox
            .convolve(&src, &mut dst, &mut scratch, 3, 3, EdgeMode::Extend)
            .unwrap_err();
        assert!(matches!(err, OpsError::SizeMismatch(_)));
    }

    #[test]
    fn test_short_scratch() {
        let src = pattern(4, 4);
        let mut dst = PixelBuffer::try_new(4, 4).unwrap();
        let mut scratch = vec![0u64; 3];
        assert!(SlidingWindowBox
            .convolve(&src, &mut dst, &mut scratch, 3, 3, EdgeMode::Extend)
            .is_err());
    }

    #[test]
    fn test_scratch_len() {
        assert_eq!(SlidingWindowBox.scratch_len(10, 3, 9, 9), 80);
        assert_eq!(SlidingWindowBox.scratch_len(0, 3, 9, 9), 0);
        assert_eq!(SlidingWindowBox.scratch_len(3, 0, 9, 9), 0);
    }
}
