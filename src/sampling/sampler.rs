//! Decimated 2-D sampling of a frame region.
//!
//! Reading every pixel of the region is wasteful: the lamps are large
//! relative to pixel pitch, so a stride of a few pixels in both axes keeps
//! the signal while bounding per-frame work.

use super::{Roi, SamplingError};
use crate::capture::Frame;

/// One RGB reading from a sampled position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Sample {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Brightness proxy `r + g + b`.
    #[inline]
    pub fn brightness(&self) -> u16 {
        u16::from(self.r) + u16::from(self.g) + u16::from(self.b)
    }
}

/// A sample together with its offset inside the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePoint {
    /// Column offset from the region's left edge.
    pub dx: u32,
    /// Row offset from the region's top edge.
    pub dy: u32,
    pub sample: Sample,
}

/// Validated view of a frame region sampled on a `step`-pixel grid.
///
/// Iterating is lazy and can be repeated; the frame is only borrowed.
#[derive(Debug, Clone, Copy)]
pub struct SampleGrid<'a> {
    frame: &'a Frame,
    roi: Roi,
    step: u32,
}

impl<'a> SampleGrid<'a> {
    /// Checks the frame buffer, region and stride.
    pub fn new(frame: &'a Frame, roi: Roi, step: u32) -> Result<Self, SamplingError> {
        if step == 0 {
            return Err(SamplingError::ZeroStep);
        }
        if !frame.is_valid() {
            return Err(SamplingError::MalformedFrame {
                expected: frame.expected_len(),
                actual: frame.pixels().len(),
            });
        }
        roi.ensure_within(frame.width(), frame.height())?;
        Ok(Self { frame, roi, step })
    }

    #[inline]
    pub fn roi(&self) -> Roi {
        self.roi
    }

    #[inline]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Number of sampled columns.
    #[inline]
    pub fn columns(&self) -> u32 {
        self.roi.width.div_ceil(self.step)
    }

    /// Number of sampled rows.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.roi.height.div_ceil(self.step)
    }

    /// Total samples a full pass yields.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a fresh pass over the region.
    pub fn iter(&self) -> SampleIter<'a> {
        SampleIter {
            pixels: self.frame.pixels(),
            stride: self.frame.width() as usize,
            bpp: self.frame.format().bytes_per_pixel(),
            roi: self.roi,
            step: self.step,
            dx: 0,
            dy: 0,
        }
    }
}

impl<'a> IntoIterator for &SampleGrid<'a> {
    type Item = SamplePoint;
    type IntoIter = SampleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Row-major iterator over sampled positions.
pub struct SampleIter<'a> {
    pixels: &'a [u8],
    stride: usize,
    bpp: usize,
    roi: Roi,
    step: u32,
    dx: u32,
    dy: u32,
}

impl Iterator for SampleIter<'_> {
    type Item = SamplePoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.dy >= self.roi.height {
            return None;
        }

        let (dx, dy) = (self.dx, self.dy);
        let x = (self.roi.x + dx) as usize;
        let y = (self.roi.y + dy) as usize;
        let idx = (y * self.stride + x) * self.bpp;
        // Bounds were checked when the grid was built
        let px = &self.pixels[idx..idx + 3];

        self.dx += self.step;
        if self.dx >= self.roi.width {
            self.dx = 0;
            self.dy += self.step;
        }

        Some(SamplePoint {
            dx,
            dy,
            sample: Sample::new(px[0], px[1], px[2]),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.dy >= self.roi.height {
            return (0, Some(0));
        }
        let cols = self.roi.width.div_ceil(self.step) as usize;
        let rows_left = (self.roi.height - self.dy).div_ceil(self.step) as usize;
        let done_in_row = (self.dx / self.step) as usize;
        let n = rows_left * cols - done_in_row;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SampleIter<'_> {}
