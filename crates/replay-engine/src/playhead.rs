//! Index cursor bound to its essence file.
//!
//! All reads in a tick go through [`Playhead::read_entry`], which turns every
//! failure into "nothing to read" and leaves the cursor on the entry that
//! could not be shown, so the next tick retries it.

use crate::carry::FieldSource;
use replay_core::{FieldMode, FrameBuffer, Result};
use replay_media::{EssenceReader, IndexHeader, IndexNavigator, NavEntry, SeekMode};
use tracing::{trace, warn};

/// One decoded index entry.
#[derive(Debug)]
pub struct SourceEntry {
    /// Entry number in the index
    pub entry: u64,
    /// Decoded field or frame
    pub buffer: FrameBuffer,
}

pub struct Playhead {
    index: IndexNavigator,
    essence: EssenceReader,
}

impl Playhead {
    pub fn new(index: IndexNavigator, essence: EssenceReader) -> Self {
        Self { index, essence }
    }

    pub fn header(&self) -> &IndexHeader {
        self.index.header()
    }

    #[inline]
    pub fn field_mode(&self) -> FieldMode {
        self.index.header().field_mode
    }

    /// Entry the next read will return.
    #[inline]
    pub fn position(&self) -> u64 {
        self.index.position()
    }

    pub fn is_before_start(&self) -> bool {
        self.index.is_before_start()
    }

    /// Entries currently in the index.
    pub fn entry_count(&self) -> Result<u64> {
        self.index.entry_count()
    }

    /// Read and decode the entry at the cursor, advancing past it.
    ///
    /// `None` covers end of data as well as I/O and decode failures; the
    /// latter are logged and the cursor is put back.
    pub fn read_entry(&mut self) -> Option<SourceEntry> {
        let entry = self.index.position();
        let offset = match self.index.read_next() {
            Ok(NavEntry::Offset(offset)) => offset,
            Ok(NavEntry::EndOfData) => {
                trace!("End of data at entry {}", entry);
                return None;
            }
            Err(e) => {
                warn!("Index read at entry {} failed: {}", entry, e);
                return None;
            }
        };

        match self.essence.read_at(offset) {
            Ok(payload) => Some(SourceEntry {
                entry,
                buffer: payload.buffer,
            }),
            Err(e) => {
                warn!(
                    "Essence read for entry {} at offset {} failed: {}",
                    entry, offset, e
                );
                self.index.step(-1);
                None
            }
        }
    }

    /// Move the cursor by `delta` entries.
    #[inline]
    pub fn step(&mut self, delta: i64) {
        self.index.step(delta);
    }

    /// Put an odd cursor on a frame boundary: forward moves up to the next
    /// pair, reverse moves back to the start of the current one.
    pub fn align_to_frame(&mut self, reverse: bool) {
        if self.index.is_before_start() || self.index.position() % 2 == 0 {
            return;
        }
        self.index.step(if reverse { -1 } else { 1 });
    }

    /// Reposition in entries; returns the new cursor.
    pub fn seek(&mut self, entries: u64, mode: SeekMode) -> Result<u64> {
        self.index.seek(entries, mode)
    }

    /// Leave the parked-before-start state.
    pub fn clear_rewind_guard(&mut self) {
        self.index.clear_rewind_guard();
    }

    /// Walk single fields in playback direction.
    pub fn fields(&mut self, reverse: bool) -> FieldWalk<'_> {
        FieldWalk {
            playhead: self,
            reverse,
        }
    }
}

/// Field-by-field view of a [`Playhead`], used by the fractional carry.
pub struct FieldWalk<'a> {
    playhead: &'a mut Playhead,
    reverse: bool,
}

impl FieldSource for FieldWalk<'_> {
    fn next_field(&mut self) -> Option<FrameBuffer> {
        let source = self.playhead.read_entry()?;
        if self.reverse {
            self.playhead.step(-2);
        }
        Some(source.buffer)
    }

    fn rewind(&mut self) {
        if !self.reverse {
            self.playhead.step(-1);
        } else if self.playhead.is_before_start() {
            // only entry 0 parks the cursor
            self.playhead.clear_rewind_guard();
        } else {
            self.playhead.step(1);
        }
    }
}
