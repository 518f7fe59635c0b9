//! Index file navigation.
//!
//! The index is a 24-byte header followed by one little-endian `i64` byte
//! offset per captured field or frame. A recorder may still be appending to
//! it while we play, so the entry count is always derived from the current
//! file length and a partially written trailing entry is ignored.

use bytemuck::{Pod, Zeroable};
use chrono::{DateTime, Utc};
use replay_core::{FieldMode, ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Size of the index header in bytes.
pub const INDEX_HEADER_SIZE: u64 = 24;

/// Size of one index entry in bytes.
pub const INDEX_ENTRY_SIZE: u64 = 8;

/// Entries kept between a from-end seek target and the live end of the index.
pub const DEFAULT_FROM_END_MARGIN: u64 = 4;

/// On-disk header layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RawIndexHeader {
    begin_timecode_us: i64,
    field_mode: u32,
    width: u32,
    height: u32,
    reserved: u32,
}

/// Capture metadata stored at the start of an index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHeader {
    /// Wall-clock time of the first captured entry
    pub begin_timecode: DateTime<Utc>,
    /// Field order of the capture
    pub field_mode: FieldMode,
    /// Full frame width in pixels
    pub width: u32,
    /// Full frame height in pixels
    pub height: u32,
}

impl IndexHeader {
    /// Decode a header from its on-disk bytes.
    pub fn from_bytes(bytes: &[u8; INDEX_HEADER_SIZE as usize]) -> Result<Self> {
        let raw: RawIndexHeader = bytemuck::pod_read_unaligned(bytes);
        let micros = i64::from_le(raw.begin_timecode_us);
        let begin_timecode = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
            ReplayError::InvalidArgument(format!("Index timecode {} out of range", micros))
        })?;
        let field_mode = FieldMode::from_raw(u32::from_le(raw.field_mode)).ok_or_else(|| {
            ReplayError::InvalidArgument(format!(
                "Unknown field mode {} in index header",
                u32::from_le(raw.field_mode)
            ))
        })?;
        Ok(Self {
            begin_timecode,
            field_mode,
            width: u32::from_le(raw.width),
            height: u32::from_le(raw.height),
        })
    }

    /// Read a header from the start of `reader`.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; INDEX_HEADER_SIZE as usize];
        reader.read_exact(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Encode the header in its on-disk form.
    pub fn to_bytes(&self) -> [u8; INDEX_HEADER_SIZE as usize] {
        let raw = RawIndexHeader {
            begin_timecode_us: self.begin_timecode.timestamp_micros().to_le(),
            field_mode: self.field_mode.to_raw().to_le(),
            width: self.width.to_le(),
            height: self.height.to_le(),
            reserved: 0,
        };
        let mut out = [0u8; INDEX_HEADER_SIZE as usize];
        out.copy_from_slice(bytemuck::bytes_of(&raw));
        out
    }
}

/// How long to wait for a freshly created index to receive its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenPolicy {
    /// First sleep between polls
    pub initial_backoff: Duration,
    /// Upper bound for a single sleep
    pub max_backoff: Duration,
    /// Total time before giving up with `TransientUnavailable`
    pub timeout: Duration,
}

impl Default for OpenPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(160),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Seek origin for [`IndexNavigator::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeekMode {
    /// Entry `amount` from the start.
    Absolute,
    /// `amount` entries after the cursor.
    RelativeForward,
    /// `amount` entries before the cursor.
    RelativeBackward,
    /// `amount` entries (plus the safety margin) before the live end.
    FromEnd,
}

/// Result of reading one index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEntry {
    /// Byte offset of the payload in the essence file.
    Offset(u64),
    /// Nothing to read at the cursor (before start, or at the live end).
    EndOfData,
}

const BEFORE_START: i64 = -1;

/// Cursor over the entries of an index file.
pub struct IndexNavigator {
    path: PathBuf,
    file: File,
    header: IndexHeader,
    cursor: i64,
    from_end_margin: u64,
}

impl IndexNavigator {
    /// Open an index file, waiting under `policy` while it is still empty.
    pub fn open<P: AsRef<Path>>(path: P, policy: &OpenPolicy) -> Result<Self> {
        let path = path.as_ref();
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ReplayError::NotFound(format!(
                    "Index file {} not found",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        wait_for_header(&file, path, policy)?;

        file.seek(SeekFrom::Start(0))?;
        let header = IndexHeader::read_from(&mut file)?;
        info!(
            "Index {} starts at {} ({}, {}x{})",
            path.display(),
            header.begin_timecode.to_rfc3339(),
            header.field_mode,
            header.width,
            header.height
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            cursor: 0,
            from_end_margin: DEFAULT_FROM_END_MARGIN,
        })
    }

    /// Override the margin kept by from-end seeks.
    pub fn with_from_end_margin(mut self, margin: u64) -> Self {
        self.from_end_margin = margin;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &IndexHeader {
        &self.header
    }

    /// Number of complete entries currently in the file.
    pub fn entry_count(&self) -> Result<u64> {
        let len = self.file.metadata()?.len();
        Ok(len.saturating_sub(INDEX_HEADER_SIZE) / INDEX_ENTRY_SIZE)
    }

    /// Entry the next `read_next` will read (0 while parked before start).
    #[inline]
    pub fn position(&self) -> u64 {
        self.cursor.max(0) as u64
    }

    /// Whether a reverse step ran past entry 0.
    #[inline]
    pub fn is_before_start(&self) -> bool {
        self.cursor < 0
    }

    /// Read the entry at the cursor and advance by one.
    ///
    /// The cursor does not move when there is nothing to read, so playback
    /// resumes by itself once the recorder appends more entries.
    pub fn read_next(&mut self) -> Result<NavEntry> {
        if self.cursor < 0 {
            return Ok(NavEntry::EndOfData);
        }

        let at = INDEX_HEADER_SIZE + self.cursor as u64 * INDEX_ENTRY_SIZE;
        self.file.seek(SeekFrom::Start(at))?;
        let mut bytes = [0u8; INDEX_ENTRY_SIZE as usize];
        match self.file.read_exact(&mut bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(NavEntry::EndOfData),
            Err(e) => return Err(e.into()),
        }

        let offset = i64::from_le_bytes(bytes);
        if offset < 0 {
            // writer placeholder
            return Ok(NavEntry::EndOfData);
        }

        self.cursor += 1;
        Ok(NavEntry::Offset(offset as u64))
    }

    /// Move the cursor by `delta` entries. Running past entry 0 parks the
    /// cursor before start, where every read reports end of data.
    pub fn step(&mut self, delta: i64) {
        if self.cursor < 0 && delta >= 0 {
            return;
        }
        let next = self.cursor.saturating_add(delta);
        self.cursor = if next < 0 { BEFORE_START } else { next };
    }

    /// Bring a cursor parked before start back to entry 0.
    pub fn clear_rewind_guard(&mut self) {
        if self.cursor < 0 {
            self.cursor = 0;
        }
    }

    /// Reposition the cursor, clamped to `[0, entry_count]`.
    pub fn seek(&mut self, amount: u64, mode: SeekMode) -> Result<u64> {
        let amount = i64::try_from(amount).unwrap_or(i64::MAX);
        let current = self.cursor.max(0);
        let total = i64::try_from(self.entry_count()?).unwrap_or(i64::MAX);
        let target = match mode {
            SeekMode::Absolute => amount,
            SeekMode::RelativeForward => current.saturating_add(amount),
            SeekMode::RelativeBackward => current.saturating_sub(amount),
            SeekMode::FromEnd => total
                .saturating_sub(amount)
                .saturating_sub(self.from_end_margin as i64),
        };
        self.cursor = target.clamp(0, total);
        debug!("Index seek {:?} {} -> entry {}", mode, amount, self.cursor);
        Ok(self.cursor as u64)
    }
}

fn wait_for_header(file: &File, path: &Path, policy: &OpenPolicy) -> Result<()> {
    let started = Instant::now();
    let mut backoff = policy.initial_backoff;
    let mut warned = false;

    loop {
        if file.metadata()?.len() >= INDEX_HEADER_SIZE {
            return Ok(());
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            return Err(ReplayError::TransientUnavailable(format!(
                "Index file {} still empty after {:?}",
                path.display(),
                policy.timeout
            )));
        }

        if !warned {
            warn!("Waiting for index file {} to grow", path.display());
            warned = true;
        }
        thread::sleep(backoff.min(policy.timeout - elapsed));
        backoff = (backoff * 2).min(policy.max_backoff);
    }
}
