//! Fractional-speed field carry.
//!
//! Between 0.5x and 1x an interlaced clip is shown by cross-fading source
//! fields. The last fetched field is carried from tick to tick together with
//! the share of its display time that is still unconsumed. Every tick emits
//! two output fields; each either reuses the carried image or fetches the
//! next source field and blends it with the carried one.

use replay_compose::FieldCompositor;
use replay_core::{FrameBuffer, Result};

/// Display time one output field takes from the carry when it is reused.
const HALF: f64 = 0.5;

/// Supplies source fields in playback order.
pub trait FieldSource {
    /// Next field, or `None` at end of data.
    fn next_field(&mut self) -> Option<FrameBuffer>;

    /// Give back the field returned by the last successful `next_field`.
    fn rewind(&mut self);
}

/// Field retained between fractional ticks.
#[derive(Debug, Clone)]
pub struct FieldCarry {
    field: FrameBuffer,
    left: f64,
}

impl FieldCarry {
    pub fn field(&self) -> &FrameBuffer {
        &self.field
    }

    /// Unconsumed display time of the carried field, in `[0, 1)`.
    pub fn left(&self) -> f64 {
        self.left
    }
}

/// Produce one fractional-speed frame.
///
/// Returns `Ok(None)` when the source ran dry; the carry then reflects
/// exactly the fields that were consumed, so the next tick resumes cleanly.
pub fn fractional_step<S: FieldSource>(
    carry: &mut Option<FieldCarry>,
    source: &mut S,
    abs_speed: f64,
    compositor: &FieldCompositor,
) -> Result<Option<FrameBuffer>> {
    match carry.as_mut() {
        Some(state) => advance(state, source, abs_speed, compositor),
        None => start(carry, source, abs_speed, compositor),
    }
}

fn start<S: FieldSource>(
    carry: &mut Option<FieldCarry>,
    source: &mut S,
    abs_speed: f64,
    compositor: &FieldCompositor,
) -> Result<Option<FrameBuffer>> {
    let Some(first) = source.next_field() else {
        return Ok(None);
    };
    let Some(second) = source.next_field() else {
        source.rewind();
        return Ok(None);
    };

    let weight = (2.0 * (1.0 - abs_speed)) as f32;
    let blended = compositor.blend(&first, &second, weight)?;
    let frame = compositor.interlace(&first, &blended)?;

    *carry = Some(FieldCarry {
        field: second,
        left: frac(2.0 * abs_speed),
    });
    Ok(Some(frame))
}

fn advance<S: FieldSource>(
    carry: &mut FieldCarry,
    source: &mut S,
    abs_speed: f64,
    compositor: &FieldCompositor,
) -> Result<Option<FrameBuffer>> {
    let left = carry.left;

    let (first_half, after_first, fetched) = if left > HALF {
        (carry.field.clone(), left - HALF, false)
    } else {
        let Some(next) = source.next_field() else {
            return Ok(None);
        };
        let half = cross_fade(&carry.field, &next, left, compositor)?;
        carry.field = next;
        (half, frac(left + abs_speed), true)
    };

    let (second_half, after_second) = if after_first > HALF {
        (first_half.clone(), after_first - HALF)
    } else {
        let Some(next) = source.next_field() else {
            if fetched {
                carry.left = after_first;
            }
            return Ok(None);
        };
        let half = cross_fade(&carry.field, &next, after_first, compositor)?;
        carry.field = next;
        (half, frac(after_first + abs_speed))
    };

    carry.left = after_second;
    compositor.interlace(&first_half, &second_half).map(Some)
}

/// Blend the carried field into the next one. Nothing left of the carry
/// means the next field is shown as is.
fn cross_fade(
    carried: &FrameBuffer,
    next: &FrameBuffer,
    left: f64,
    compositor: &FieldCompositor,
) -> Result<FrameBuffer> {
    if left > 0.0 {
        compositor.blend(carried, next, (1.0 - left) as f32)
    } else {
        Ok(next.clone())
    }
}

#[inline]
fn frac(x: f64) -> f64 {
    x - x.trunc()
}
