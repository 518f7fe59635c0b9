//! Essence file reading.
//!
//! The essence file is a plain concatenation of records, each a little-endian
//! `u32` payload length followed by the encoded payload. Turning a payload
//! into pixels is delegated to a [`PayloadDecoder`].

use replay_core::{FrameBuffer, PixelFormat, ReplayError, Result};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{info, trace};

/// Upper bound for a single payload, guards against reading a garbage length.
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

/// Pixels produced by a decoder.
pub struct DecodedField {
    pub width: u32,
    pub height: u32,
    /// Packed BGRA, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

/// Turns one encoded payload into BGRA pixels.
pub trait PayloadDecoder: Send {
    /// Decoder name for logs.
    fn name(&self) -> &str;

    /// Decode one payload.
    fn decode(&self, payload: &[u8]) -> Result<DecodedField>;
}

/// Uncompressed payloads: `u32 width`, `u32 height`, then BGRA pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBgraDecoder;

impl RawBgraDecoder {
    const PREFIX: usize = 8;

    /// Build a complete essence record (length prefix included) for a frame.
    pub fn encode_record(frame: &FrameBuffer) -> Vec<u8> {
        let payload_len = Self::PREFIX + frame.byte_size();
        let mut out = Vec::with_capacity(4 + payload_len);
        out.extend_from_slice(&(payload_len as u32).to_le_bytes());
        out.extend_from_slice(&frame.width.to_le_bytes());
        out.extend_from_slice(&frame.height.to_le_bytes());
        out.extend_from_slice(frame.data());
        out
    }
}

impl PayloadDecoder for RawBgraDecoder {
    fn name(&self) -> &str {
        "raw-bgra"
    }

    fn decode(&self, payload: &[u8]) -> Result<DecodedField> {
        if payload.len() < Self::PREFIX {
            return Err(ReplayError::Decoder(format!(
                "Raw payload of {} bytes has no dimensions",
                payload.len()
            )));
        }
        let width = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let height = u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
        let pixels = &payload[Self::PREFIX..];
        if pixels.len() != PixelFormat::Bgra8.frame_size(width, height) {
            return Err(ReplayError::Decoder(format!(
                "Raw payload for {}x{} carries {} pixel bytes",
                width,
                height,
                pixels.len()
            )));
        }
        Ok(DecodedField {
            width,
            height,
            pixels: pixels.to_vec(),
        })
    }
}

/// One payload read from the essence file.
#[derive(Debug, Clone)]
pub struct EssencePayload {
    /// Decoded pixels, owned by the caller
    pub buffer: FrameBuffer,
    /// Encoded size on disk, without the length prefix
    pub byte_size: usize,
}

impl EssencePayload {
    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height
    }
}

/// Random-access reader over an essence file.
pub struct EssenceReader {
    path: PathBuf,
    file: File,
    decoder: Box<dyn PayloadDecoder>,
    scratch: Vec<u8>,
}

impl EssenceReader {
    /// Open an essence file of uncompressed payloads.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_decoder(path, Box::new(RawBgraDecoder))
    }

    /// Open an essence file whose payloads need `decoder`.
    pub fn open_with_decoder<P: AsRef<Path>>(
        path: P,
        decoder: Box<dyn PayloadDecoder>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ReplayError::NotFound(format!(
                    "Video essence file {} not found",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        info!("Opened essence {} ({})", path.display(), decoder.name());
        Ok(Self {
            path: path.to_path_buf(),
            file,
            decoder,
            scratch: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the record starting at `offset`.
    pub fn read_at(&mut self, offset: u64) -> Result<EssencePayload> {
        self.file.seek(SeekFrom::Start(offset))?;

        let mut len_bytes = [0u8; 4];
        self.file.read_exact(&mut len_bytes)?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        if len > MAX_PAYLOAD_SIZE {
            return Err(ReplayError::Decoder(format!(
                "Payload at {} claims {} bytes",
                offset, len
            )));
        }

        self.scratch.resize(len, 0);
        self.file.read_exact(&mut self.scratch)?;
        trace!("Read {} byte payload at {}", len, offset);

        let decoded = self.decoder.decode(&self.scratch)?;
        let buffer = FrameBuffer::from_vec(
            decoded.width,
            decoded.height,
            PixelFormat::Bgra8,
            decoded.pixels,
        )?;
        Ok(EssencePayload {
            buffer,
            byte_size: len,
        })
    }
}
