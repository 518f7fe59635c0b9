//! Field order of a captured stream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the entries of an index map onto displayed frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldMode {
    /// One index entry per full frame.
    #[default]
    Progressive,
    /// Two entries per frame, the upper (even rows) field captured first.
    UpperFirst,
    /// Two entries per frame, the lower (odd rows) field captured first.
    LowerFirst,
}

impl FieldMode {
    /// Decode the on-disk representation.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Progressive),
            1 => Some(Self::UpperFirst),
            2 => Some(Self::LowerFirst),
            _ => None,
        }
    }

    /// On-disk representation.
    pub fn to_raw(self) -> u32 {
        match self {
            Self::Progressive => 0,
            Self::UpperFirst => 1,
            Self::LowerFirst => 2,
        }
    }

    #[inline]
    pub fn is_interlaced(self) -> bool {
        !matches!(self, Self::Progressive)
    }

    /// Index entries that make up one displayed frame.
    #[inline]
    pub fn entries_per_frame(self) -> u64 {
        if self.is_interlaced() {
            2
        } else {
            1
        }
    }
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Progressive => "progressive",
            Self::UpperFirst => "upper-first",
            Self::LowerFirst => "lower-first",
        };
        f.write_str(name)
    }
}
