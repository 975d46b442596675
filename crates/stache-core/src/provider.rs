//! Loading compiled tables.

use std::io;

use crate::format::FORMAT_VERSION;
use crate::table::ParseTable;

/// Errors raised while loading a grammar table.
///
/// These are the only errors surfaced to callers of the binding layer: lexing
/// and parsing problems are recovered inside the tree.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("table too small: {0} bytes (minimum 32)")]
    TooSmall(usize),
    #[error("invalid magic: expected STBL")]
    InvalidMagic,
    #[error("unsupported version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {expected:#010x}, payload hashes to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("table decode error: {0}")]
    Decode(#[from] postcard::Error),
    #[error("malformed table: {0}")]
    Malformed(String),
    #[error("table declares {externals} external tokens but no scanner was supplied")]
    MissingScanner { externals: usize },
    #[error("invalid pattern for terminal `{terminal}`: {message}")]
    InvalidPattern { terminal: String, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Something that can hand a compiled grammar to the runtime.
pub trait GrammarProvider {
    /// Format version the tables were produced for.
    fn version(&self) -> u32;

    fn tables(&self) -> &ParseTable;
}

impl GrammarProvider for ParseTable {
    fn version(&self) -> u32 {
        FORMAT_VERSION
    }

    fn tables(&self) -> &ParseTable {
        self
    }
}

impl<P: GrammarProvider + ?Sized> GrammarProvider for &P {
    fn version(&self) -> u32 {
        (**self).version()
    }

    fn tables(&self) -> &ParseTable {
        (**self).tables()
    }
}
