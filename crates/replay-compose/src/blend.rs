//! Cross-fade blending of two fields.
//!
//! `out = a * weight + b * (1 - weight)` per channel. The default quantizes
//! the weight to 64 levels and mixes in integer arithmetic.

use rayon::prelude::*;
use replay_core::{FrameBuffer, Result};
use serde::{Deserialize, Serialize};

/// Highest quantized weight level.
pub const LEGACY_LEVELS: u32 = 63;

/// How the blend weight is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendPrecision {
    /// Weight truncated to `0..=63`, integer arithmetic.
    #[default]
    Legacy64,
    /// Floating point weight, rounded per channel.
    Continuous,
}

/// Quantize a weight in `[0, 1]` to a legacy level.
#[inline]
pub fn legacy_level(weight: f32) -> u32 {
    (weight.clamp(0.0, 1.0) * LEGACY_LEVELS as f32) as u32
}

/// Blend `a` over `b`. `weight` is the share of `a`.
pub fn blend(
    a: &FrameBuffer,
    b: &FrameBuffer,
    weight: f32,
    precision: BlendPrecision,
) -> Result<FrameBuffer> {
    a.ensure_same_dimensions(b)?;

    if precision == BlendPrecision::Legacy64 {
        match legacy_level(weight) {
            LEGACY_LEVELS => return Ok(a.clone()),
            0 => return Ok(b.clone()),
            _ => {}
        }
    }

    let mut out = FrameBuffer::new(a.width, a.height, a.format);
    let stride = a.stride().max(1);
    let rows = out
        .data_mut()
        .par_chunks_mut(stride)
        .zip(a.data().par_chunks(stride))
        .zip(b.data().par_chunks(stride));

    match precision {
        BlendPrecision::Legacy64 => {
            let level = legacy_level(weight);
            let inv = LEGACY_LEVELS - level;
            rows.for_each(|((out_row, a_row), b_row)| {
                for ((o, &pa), &pb) in out_row.iter_mut().zip(a_row).zip(b_row) {
                    let mixed = pa as u32 * level + pb as u32 * inv + LEGACY_LEVELS / 2;
                    *o = (mixed / LEGACY_LEVELS) as u8;
                }
            });
        }
        BlendPrecision::Continuous => {
            let w = weight.clamp(0.0, 1.0);
            let iw = 1.0 - w;
            rows.for_each(|((out_row, a_row), b_row)| {
                for ((o, &pa), &pb) in out_row.iter_mut().zip(a_row).zip(b_row) {
                    *o = (pa as f32 * w + pb as f32 * iw).round().clamp(0.0, 255.0) as u8;
                }
            });
        }
    }

    Ok(out)
}
