//! Replay Media - index and essence file I/O
//!
//! This crate handles:
//! - Index file navigation (header, entry offsets, seeks, live growth)
//! - Essence payload reading and the decoder seam
//! - Clip path resolution

pub mod clip;
pub mod essence;
pub mod index;

pub use clip::ClipPaths;
pub use essence::{DecodedField, EssencePayload, EssenceReader, PayloadDecoder, RawBgraDecoder};
pub use index::{IndexHeader, IndexNavigator, NavEntry, OpenPolicy, SeekMode};
