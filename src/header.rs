//! REK file header (Fraunhofer EZRT raw volume format).
//!
//! # On-disk layout
//! The header is a fixed 2048-byte record, strictly little-endian, no padding:
//!
//! | Offset | Size | Field       |
//! |-------:|-----:|-------------|
//! |      0 |    2 | `size_x`    |
//! |      2 |    2 | `size_y`    |
//! |      4 |    2 | `pixel`     |
//! |      6 |    2 | `size_z`    |
//! |      8 |  572 | reserved    |
//! |    580 |    4 | `some_value`|
//! |    584 |    4 | `pixel_size`|
//! |    588 |    4 | `slice_dist`|
//! |    592 | 1456 | reserved    |
//!
//! Voxel samples follow the header immediately, uncompressed.
//! Reserved regions are always written as zeros and skipped on read.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Total header size in bytes.
pub const HEADER_SIZE: usize = 2048;

pub const RESERVED1_OFFSET: usize = 8;
pub const RESERVED1_SIZE:   usize = 572;
pub const SOME_VALUE_OFFSET: usize = RESERVED1_OFFSET + RESERVED1_SIZE;
pub const PIXEL_SIZE_OFFSET: usize = SOME_VALUE_OFFSET + 4;
pub const SLICE_DIST_OFFSET: usize = PIXEL_SIZE_OFFSET + 4;
pub const RESERVED2_OFFSET: usize = SLICE_DIST_OFFSET + 4;
pub const RESERVED2_SIZE:   usize = 1456;

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("file too short for a REK header ({len} bytes, need 2048)")]
    Truncated { len: u64 },
    #[error("unknown pixel format code {0}")]
    PixelFormat(u16),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── PixelFormat ──────────────────────────────────────────────────────────────

/// Voxel sample type, stored in the header as its bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Int16,
    Float32,
}

impl PixelFormat {
    /// Header `pixel` code.
    pub fn code(self) -> u16 {
        match self {
            PixelFormat::Int16   => 16,
            PixelFormat::Float32 => 32,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            16 => Some(PixelFormat::Int16),
            32 => Some(PixelFormat::Float32),
            _  => None,
        }
    }

    pub fn bytes_per_sample(self) -> u64 {
        match self {
            PixelFormat::Int16   => 2,
            PixelFormat::Float32 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Int16   => "int16",
            PixelFormat::Float32 => "float32",
        }
    }
}

// ── RekHeader ────────────────────────────────────────────────────────────────

/// In-memory form of the 2048-byte REK header.
///
/// `pixel` is kept as the raw code so that an unset or unknown format can be
/// represented until validation; use [`RekHeader::pixel_format`] to interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RekHeader {
    pub size_x:     u16,
    pub size_y:     u16,
    pub pixel:      u16,
    pub size_z:     u16,
    pub some_value: f32,
    /// In-plane voxel size, microns.
    pub pixel_size: f32,
    /// Slice step, microns.
    pub slice_dist: f32,
}

impl RekHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pixel_format(&self) -> Option<PixelFormat> {
        PixelFormat::from_code(self.pixel)
    }

    pub fn set_pixel_format(&mut self, format: PixelFormat) {
        self.pixel = format.code();
    }

    pub fn voxel_count(&self) -> u64 {
        u64::from(self.size_x) * u64::from(self.size_y) * u64::from(self.size_z)
    }

    /// Payload size in bytes implied by the dimensions and pixel format,
    /// or `None` when the pixel code is not recognised.
    pub fn payload_size(&self) -> Option<u64> {
        let format = self.pixel_format()?;
        Some(format.bytes_per_sample() * self.voxel_count())
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.size_x)?;
        writer.write_u16::<LittleEndian>(self.size_y)?;
        writer.write_u16::<LittleEndian>(self.pixel)?;
        writer.write_u16::<LittleEndian>(self.size_z)?;
        writer.write_all(&[0u8; RESERVED1_SIZE])?;
        writer.write_f32::<LittleEndian>(self.some_value)?;
        writer.write_f32::<LittleEndian>(self.pixel_size)?;
        writer.write_f32::<LittleEndian>(self.slice_dist)?;
        writer.write_all(&[0u8; RESERVED2_SIZE])?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        // Writing into a Vec cannot fail.
        let _ = self.write(&mut buf);
        buf
    }

    pub fn read<R: Read>(mut reader: R) -> Result<Self, HeaderError> {
        let size_x = reader.read_u16::<LittleEndian>()?;
        let size_y = reader.read_u16::<LittleEndian>()?;
        let pixel  = reader.read_u16::<LittleEndian>()?;
        let size_z = reader.read_u16::<LittleEndian>()?;
        let mut reserved1 = [0u8; RESERVED1_SIZE];
        reader.read_exact(&mut reserved1)?;
        let some_value = reader.read_f32::<LittleEndian>()?;
        let pixel_size = reader.read_f32::<LittleEndian>()?;
        let slice_dist = reader.read_f32::<LittleEndian>()?;
        let mut reserved2 = [0u8; RESERVED2_SIZE];
        reader.read_exact(&mut reserved2)?;
        Ok(Self {
            size_x,
            size_y,
            pixel,
            size_z,
            some_value,
            pixel_size,
            slice_dist,
        })
    }

    /// Read the header at the start of a REK file and return it together
    /// with the total file length.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<(Self, u64), HeaderError> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len < HEADER_SIZE as u64 {
            return Err(HeaderError::Truncated { len });
        }
        let header = Self::read(BufReader::new(file))?;
        Ok((header, len))
    }
}
