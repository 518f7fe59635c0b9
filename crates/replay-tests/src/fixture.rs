//! Recording fixtures.
//!
//! Every entry is a flat image whose bytes all equal `entry * step`, so a
//! composed frame tells which entries went into it.

use chrono::{DateTime, Utc};
use replay_core::{FieldMode, FrameBuffer, PixelFormat};
use replay_engine::{ReplayConfig, ReplayProducer, SeekTarget};
use replay_media::{IndexHeader, RawBgraDecoder};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const WIDTH: u32 = 4;
pub const HEIGHT: u32 = 4;

pub struct Recording {
    dir: TempDir,
    mode: FieldMode,
    step: u8,
    entries: u64,
    essence_len: u64,
}

impl Recording {
    pub fn progressive(frames: u64) -> Self {
        Self::with_entries(FieldMode::Progressive, frames, 1)
    }

    pub fn interlaced(mode: FieldMode, fields: u64) -> Self {
        Self::with_entries(mode, fields, 1)
    }

    pub fn with_entries(mode: FieldMode, entries: u64, step: u8) -> Self {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("clip.mav")).unwrap();
        let mut index = File::create(dir.path().join("clip.idx")).unwrap();
        index.write_all(&header(mode).to_bytes()).unwrap();

        let mut recording = Self {
            dir,
            mode,
            step,
            entries: 0,
            essence_len: 0,
        };
        recording.append(entries);
        recording
    }

    /// Progressive recording whose row `y` of entry `e` holds `10 * e + y`.
    pub fn striped(frames: u64) -> Self {
        let mut recording = Self::progressive(0);
        for entry in 0..frames {
            let mut image = FrameBuffer::new(WIDTH, HEIGHT, PixelFormat::Bgra8);
            for y in 0..HEIGHT {
                image.row_mut(y).fill(entry as u8 * 10 + y as u8);
            }
            recording.append_image(&image);
        }
        recording
    }

        /// Essence file with an index that has no header yet.
    pub fn empty(dir: &Path) -> PathBuf {
        File::create(dir.join("clip.mav")).unwrap();
        File::create(dir.join("clip.idx")).unwrap();
        dir.join("clip.mav")
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn essence_path(&self) -> PathBuf {
        self.dir.path().join("clip.mav")
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.path().join("clip.idx")
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Append `count` entries whose values continue the sequence.
    pub fn append(&mut self, count: u64) {
        for _ in 0..count {
            let value = (self.entries as u8).wrapping_mul(self.step);
            self.append_image(&entry_image(self.mode, value));
        }
    }

    /// Append one entry holding `image`, payload first and index entry
    /// second, the way a recorder does.
    pub fn append_image(&mut self, image: &FrameBuffer) {
        let record = RawBgraDecoder::encode_record(image);
        let mut essence = OpenOptions::new()
            .append(true)
            .open(self.essence_path())
            .unwrap();
        essence.write_all(&record).unwrap();
        let mut index = OpenOptions::new()
            .append(true)
            .open(self.index_path())
            .unwrap();
        index
            .write_all(&(self.essence_len as i64).to_le_bytes())
            .unwrap();
        self.essence_len += record.len() as u64;
        self.entries += 1;
    }

    /// Append an index entry that points past the end of the essence.
    pub fn append_dangling(&mut self) {
        let mut index = OpenOptions::new()
            .append(true)
            .open(self.index_path())
            .unwrap();
        index
            .write_all(&((self.essence_len + 1_000_000) as i64).to_le_bytes())
            .unwrap();
        self.entries += 1;
    }

    pub fn open(&self) -> ReplayProducer {
        self.open_with(None, &ReplayConfig::default())
    }

    pub fn open_at(&self, start: SeekTarget) -> ReplayProducer {
        self.open_with(Some(start), &ReplayConfig::default())
    }

    pub fn open_with(&self, start: Option<SeekTarget>, config: &ReplayConfig) -> ReplayProducer {
        ReplayProducer::open(self.essence_path(), start, config).unwrap()
    }
}

pub fn header(mode: FieldMode) -> IndexHeader {
    IndexHeader {
        begin_timecode: DateTime::<Utc>::from_timestamp_micros(1_767_225_600_000_000).unwrap(),
        field_mode: mode,
        width: WIDTH,
        height: HEIGHT,
    }
}

fn entry_image(mode: FieldMode, value: u8) -> FrameBuffer {
    let height = if mode.is_interlaced() {
        HEIGHT / 2
    } else {
        HEIGHT
    };
    FrameBuffer::filled(WIDTH, height, PixelFormat::Bgra8, value)
}

/// Value of a progressive frame.
pub fn value(frame: &FrameBuffer) -> u8 {
    frame.data()[0]
}

/// Values of the two top rows of a frame.
pub fn rows(frame: &FrameBuffer) -> (u8, u8) {
    (frame.row(0)[0], frame.row(1)[0])
}
