use crate::format::{EncodedTable, FORMAT_VERSION, HEADER_SIZE, Header, MAGIC, encode};
use crate::table_tests::tiny_table;
use crate::{GrammarProvider, LoadError};

#[test]
fn header_bytes_are_little_endian() {
    let header = Header {
        checksum: 0xDEADBEEF,
        total_size: 0x0102_0304,
        payload_len: 7,
        ..Header::default()
    };

    let bytes = header.to_bytes();
    assert_eq!(&bytes[0..4], &MAGIC);
    assert_eq!(&bytes[8..12], &[0xEF, 0xBE, 0xAD, 0xDE]);
    assert_eq!(&bytes[12..16], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(Header::from_bytes(&bytes), Some(header));
    assert_eq!(Header::from_bytes(&bytes[..HEADER_SIZE - 1]), None);
}

#[test]
fn encoded_table_loads() {
    let table = tiny_table();
    let bytes = encode(&table).unwrap();

    let loaded = EncodedTable::from_bytes(&bytes).unwrap();
    assert_eq!(loaded.version(), FORMAT_VERSION);
    assert_eq!(loaded.tables(), &table);
    assert_eq!(loaded.header().total_size as usize, bytes.len());
}

#[test]
fn empty_input_is_too_small() {
    let err = EncodedTable::from_bytes(&[]).unwrap_err();
    assert!(matches!(err, LoadError::TooSmall(0)));
}

#[test]
fn bad_magic() {
    let mut bytes = encode(&tiny_table()).unwrap();
    bytes[0] = b'X';

    let err = EncodedTable::from_bytes(&bytes).unwrap_err();
    assert_eq!(err.to_string(), "invalid magic: expected STBL");
}

#[test]
fn future_version_is_rejected() {
    let mut bytes = encode(&tiny_table()).unwrap();
    bytes[4..8].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());

    let err = EncodedTable::from_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        LoadError::UnsupportedVersion { found, expected } if found == FORMAT_VERSION + 1 && expected == FORMAT_VERSION
    ));
}

#[test]
fn truncated_file_is_size_mismatch() {
    let bytes = encode(&tiny_table()).unwrap();

    let err = EncodedTable::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, LoadError::SizeMismatch { .. }));
}

#[test]
fn corrupted_payload_fails_checksum() {
    let mut bytes = encode(&tiny_table()).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let err = EncodedTable::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, LoadError::ChecksumMismatch { .. }));
}
