//! Replay Compose - field interlacing and cross-fade blending
//!
//! Everything here is pure CPU image work on packed frames:
//! - `interlace`: row interleave, field split, line doubling, row shift
//! - `blend`: per-channel linear cross-fade with legacy or continuous weights
//! - `compositor`: the above bound to one clip's field order

pub mod blend;
pub mod compositor;
pub mod interlace;

pub use blend::{blend, BlendPrecision};
pub use compositor::FieldCompositor;
pub use interlace::{interlace_ordered, interleave, line_double, shift_up_one_row, split_fields};
