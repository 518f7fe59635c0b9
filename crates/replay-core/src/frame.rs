//! Frame buffer types for fields and composed frames in CPU memory.
//!
//! Replay frames are always packed: one plane, no row padding, so a field
//! decoded from the essence file can be copied row by row into a frame.

use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pixel format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit BGRA (32 bits per pixel), the capture format
    #[default]
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra8 => 4,
        }
    }

    /// Calculate total bytes needed for a frame of this format.
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }
}

/// A packed image in CPU memory.
///
/// Used both for a single decoded field (half height for interlaced
/// sources) and for the composed output frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Pixel format
    pub format: PixelFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a zeroed frame buffer with the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            format,
            width,
            height,
            data: vec![0u8; format.frame_size(width, height)],
        }
    }

    /// Wrap already decoded pixel bytes.
    ///
    /// Fails if `data` is not exactly `width * height` pixels.
    pub fn from_vec(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = format.frame_size(width, height);
        if data.len() != expected {
            return Err(ReplayError::InvalidArgument(format!(
                "{}x{} {:?} frame needs {} bytes, got {}",
                width,
                height,
                format,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            format,
            width,
            height,
            data,
        })
    }

    /// Create a frame where every byte has the same value.
    pub fn filled(width: u32, height: u32, format: PixelFormat, value: u8) -> Self {
        Self {
            format,
            width,
            height,
            data: vec![value; format.frame_size(width, height)],
        }
    }

    /// Width and height in pixels.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Total memory usage of this frame in bytes.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Raw pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Raw pixel bytes, mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the frame and return its pixel bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get a row of pixel data.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Get a mutable row of pixel data.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Iterate over rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact panics on 0
        self.data.chunks_exact(self.stride().max(1))
    }

    /// Fail with `DimensionMismatch` unless `other` has the same geometry.
    pub fn ensure_same_dimensions(&self, other: &FrameBuffer) -> Result<()> {
        if self.dimensions() != other.dimensions() || self.format != other.format {
            return Err(ReplayError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }

    /// Create a test pattern frame (one gray level per row, wrapping at 256).
    pub fn test_pattern(width: u32, height: u32) -> Self {
        let mut frame = Self::new(width, height, PixelFormat::Bgra8);
        for y in 0..height {
            let level = (y % 256) as u8;
            for px in frame.row_mut(y).chunks_exact_mut(4) {
                px.copy_from_slice(&[level, level, level, 255]);
            }
        }
        frame
    }
}

/// Arc-wrapped frame buffer for shared ownership.
///
/// Repeating a frame hands out another reference to the same buffer.
pub type SharedFrameBuffer = Arc<FrameBuffer>;
