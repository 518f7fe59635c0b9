//! Per-clip compositor configuration.

use crate::blend::{blend, BlendPrecision};
use crate::interlace::{interlace_ordered, line_double, shift_up_one_row};
use replay_core::{FieldMode, FrameBuffer, Result};

/// Composes output frames for one clip's field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCompositor {
    mode: FieldMode,
    precision: BlendPrecision,
}

impl FieldCompositor {
    pub fn new(mode: FieldMode, precision: BlendPrecision) -> Self {
        Self { mode, precision }
    }

    pub fn field_mode(&self) -> FieldMode {
        self.mode
    }

    pub fn precision(&self) -> BlendPrecision {
        self.precision
    }

    /// Interleave two fields, `first` being the earlier captured one.
    pub fn interlace(&self, first: &FrameBuffer, second: &FrameBuffer) -> Result<FrameBuffer> {
        interlace_ordered(first, second, self.mode)
    }

    /// Cross-fade, `weight` being the share of `a`.
    pub fn blend(&self, a: &FrameBuffer, b: &FrameBuffer, weight: f32) -> Result<FrameBuffer> {
        blend(a, b, weight, self.precision)
    }

    /// Full frame from a single field.
    pub fn single_field(&self, field: &FrameBuffer) -> FrameBuffer {
        line_double(field)
    }

    /// Progressive frame as shown; odd source frames are raised one row.
    pub fn progressive(&self, mut frame: FrameBuffer, odd_frame: bool) -> FrameBuffer {
        if odd_frame {
            shift_up_one_row(&mut frame);
        }
        frame
    }
}
