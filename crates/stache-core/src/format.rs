//! Binary container for compiled tables (32-byte header + postcard payload).
//!
//! ```text
//! 0..4    magic "STBL"
//! 4..8    format version
//! 8..12   CRC-32 of the payload
//! 12..16  total size in bytes
//! 16..20  payload length
//! 20..32  reserved (zero)
//! ```
//!
//! All integers are little-endian.

use crate::provider::{GrammarProvider, LoadError};
use crate::table::ParseTable;

pub const MAGIC: [u8; 4] = *b"STBL";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 32;

/// Container header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u32,
    pub checksum: u32,
    pub total_size: u32,
    pub payload_len: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            checksum: 0,
            total_size: 0,
            payload_len: 0,
        }
    }
}

impl Header {
    /// Decode header from the first 32 bytes. Returns `None` when too short.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; HEADER_SIZE] = bytes.get(..HEADER_SIZE)?.try_into().ok()?;
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Some(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32_at(4),
            checksum: u32_at(8),
            total_size: u32_at(12),
            payload_len: u32_at(16),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == FORMAT_VERSION
    }
}

/// Encode a table into its binary container.
pub fn encode(table: &ParseTable) -> Result<Vec<u8>, postcard::Error> {
    let payload = postcard::to_allocvec(table)?;
    let header = Header {
        checksum: crc32fast::hash(&payload),
        total_size: (HEADER_SIZE + payload.len()) as u32,
        payload_len: payload.len() as u32,
        ..Header::default()
    };

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// A decoded and validated table container.
#[derive(Debug, Clone)]
pub struct EncodedTable {
    header: Header,
    table: ParseTable,
}

impl EncodedTable {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let header = Header::from_bytes(bytes).ok_or(LoadError::TooSmall(bytes.len()))?;

        if !header.validate_magic() {
            return Err(LoadError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(LoadError::UnsupportedVersion {
                found: header.version,
                expected: FORMAT_VERSION,
            });
        }
        if header.total_size as usize != bytes.len()
            || header.payload_len as usize != bytes.len() - HEADER_SIZE
        {
            return Err(LoadError::SizeMismatch {
                header: header.total_size,
                actual: bytes.len(),
            });
        }

        let payload = &bytes[HEADER_SIZE..];
        let actual = crc32fast::hash(payload);
        if actual != header.checksum {
            return Err(LoadError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        let table: ParseTable = postcard::from_bytes(payload)?;
        table.validate()?;

        Ok(Self { header, table })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn into_table(self) -> ParseTable {
        self.table
    }
}

impl GrammarProvider for EncodedTable {
    fn version(&self) -> u32 {
        self.header.version
    }

    fn tables(&self) -> &ParseTable {
        &self.table
    }
}
