//! Replay Core - Foundation types for the replay engine
//!
//! This crate provides the fundamental types shared by every replay crate:
//! - Error taxonomy (ReplayError, Result)
//! - Packed frame buffers and pixel formats
//! - Field order of captured streams

pub mod error;
pub mod field;
pub mod frame;

pub use error::{ReplayError, Result};
pub use field::FieldMode;
pub use frame::{FrameBuffer, PixelFormat, SharedFrameBuffer};
