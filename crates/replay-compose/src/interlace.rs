//! Row-level field operations.
//!
//! A field holds every other row of a frame. Output frames are built by
//! alternating the rows of two fields, or by doubling the rows of one.

use replay_core::{FieldMode, FrameBuffer, Result};

/// Build a frame whose even rows come from `even` and odd rows from `odd`.
pub fn interleave(even: &FrameBuffer, odd: &FrameBuffer) -> Result<FrameBuffer> {
    even.ensure_same_dimensions(odd)?;

    let mut frame = FrameBuffer::new(even.width, even.height * 2, even.format);
    for y in 0..even.height {
        frame.row_mut(2 * y).copy_from_slice(even.row(y));
        frame.row_mut(2 * y + 1).copy_from_slice(odd.row(y));
    }
    Ok(frame)
}

/// Interleave two consecutively captured fields according to the capture's
/// field order. `first` is the field captured first.
pub fn interlace_ordered(
    first: &FrameBuffer,
    second: &FrameBuffer,
    mode: FieldMode,
) -> Result<FrameBuffer> {
    match mode {
        FieldMode::LowerFirst => interleave(second, first),
        FieldMode::UpperFirst | FieldMode::Progressive => interleave(first, second),
    }
}

/// Split a frame into its even-row and odd-row fields.
pub fn split_fields(frame: &FrameBuffer) -> (FrameBuffer, FrameBuffer) {
    let even_rows = frame.height.div_ceil(2);
    let odd_rows = frame.height / 2;
    let mut even = FrameBuffer::new(frame.width, even_rows, frame.format);
    let mut odd = FrameBuffer::new(frame.width, odd_rows, frame.format);
    for (y, row) in frame.rows().enumerate() {
        let y = y as u32;
        if y % 2 == 0 {
            even.row_mut(y / 2).copy_from_slice(row);
        } else {
            odd.row_mut(y / 2).copy_from_slice(row);
        }
    }
    (even, odd)
}

/// Show a single field as a full frame by writing each row twice.
pub fn line_double(field: &FrameBuffer) -> FrameBuffer {
    let mut frame = FrameBuffer::new(field.width, field.height * 2, field.format);
    for (y, row) in field.rows().enumerate() {
        let y = y as u32;
        frame.row_mut(2 * y).copy_from_slice(row);
        frame.row_mut(2 * y + 1).copy_from_slice(row);
    }
    frame
}

/// Drop row 0 and move every other row up by one. The last row keeps its
/// content, so it ends up repeated.
pub fn shift_up_one_row(frame: &mut FrameBuffer) {
    let stride = frame.stride();
    if frame.height < 2 {
        return;
    }
    frame.data_mut().copy_within(stride.., 0);
}
