use stache_lib::ExternalScanner;

use super::scanner::{SERIALIZATION_BUFFER_SIZE, Scanner};
use super::tag::{Tag, TagKind};

fn scanner(tags: &[&str], sections: &[&str]) -> Scanner {
    Scanner {
        tags: tags.iter().map(|name| Tag::for_name(name.to_string())).collect(),
        mustache_tags: sections.iter().map(|name| name.to_string()).collect(),
    }
}

fn serialized(scanner: &Scanner) -> Vec<u8> {
    let mut buf = Vec::new();
    scanner.serialize(&mut buf);
    buf
}

fn restored(data: &[u8]) -> Scanner {
    let mut scanner = scanner(&["P"], &["stale"]);
    scanner.deserialize(data);
    scanner
}

#[test]
fn layout() {
    let bytes = serialized(&scanner(&["DIV", "X-A"], &["items"]));

    let mut expected = vec![2, 0, 2, 0, TagKind::Div.code(), TagKind::Custom.code(), 3];
    expected.extend_from_slice(b"X-A");
    expected.extend_from_slice(&[1, 0, 1, 0, 5]);
    expected.extend_from_slice(b"items");
    assert_eq!(bytes, expected);
}

#[test]
fn empty_state() {
    let bytes = serialized(&Scanner::default());
    assert_eq!(bytes, [0; 8]);

    let scanner = restored(&bytes);
    assert!(scanner.tags.is_empty());
    assert!(scanner.mustache_tags.is_empty());
}

#[test]
fn round_trip() {
    let original = scanner(&["HTML", "BODY", "MY-WIDGET", "UL", "LI"], &["items", "inner"]);
    let scanner = restored(&serialized(&original));

    assert_eq!(scanner.tags, original.tags);
    assert_eq!(scanner.mustache_tags, original.mustache_tags);
}

#[test]
fn serialize_appends() {
    let mut buf = vec![0xAA];
    scanner(&["DIV"], &[]).serialize(&mut buf);

    assert_eq!(buf[0], 0xAA);
    assert_eq!(buf.len(), 1 + 4 + 1 + 4);
}

#[test]
fn no_data_resets() {
    let scanner = restored(&[]);
    assert!(scanner.tags.is_empty());
    assert!(scanner.mustache_tags.is_empty());
}

#[test]
fn deep_nesting_is_truncated() {
    let original = Scanner {
        tags: vec![Tag::new(TagKind::Div); 2000],
        mustache_tags: vec!["section".to_owned(); 10],
    };
    let bytes = serialized(&original);
    assert!(bytes.len() < SERIALIZATION_BUFFER_SIZE);

    let scanner = restored(&bytes);
    assert_eq!(scanner.tags.len(), 2000);
    assert_eq!(scanner.tags[0].kind, TagKind::Div);
    assert_eq!(scanner.tags[1999].kind, TagKind::Unknown);
    assert_eq!(scanner.mustache_tags.len(), 10);
}

#[test]
fn truncated_sections_keep_their_count() {
    let original = Scanner {
        tags: Vec::new(),
        mustache_tags: vec!["a".repeat(200); 8],
    };
    let bytes = serialized(&original);
    assert!(bytes.len() < SERIALIZATION_BUFFER_SIZE);

    let scanner = restored(&bytes);
    assert_eq!(scanner.mustache_tags.len(), 8);
    assert_eq!(scanner.mustache_tags[0], "a".repeat(200));
    assert_eq!(scanner.mustache_tags[7], "");
}

#[test]
fn long_names_are_cut() {
    let original = Scanner {
        tags: vec![Tag {
            kind: TagKind::Custom,
            name: "X".repeat(300),
        }],
        mustache_tags: vec!["é".repeat(200)],
    };
    let scanner = restored(&serialized(&original));

    assert_eq!(scanner.tags[0].name.len(), 255);
    assert_eq!(scanner.mustache_tags[0], "é".repeat(127));
}

#[test]
fn torn_data_keeps_what_was_read() {
    let bytes = serialized(&scanner(&["DIV", "SPAN"], &["items"]));
    let scanner = restored(&bytes[..5]);

    assert_eq!(scanner.tags, [Tag::new(TagKind::Div)]);
    assert!(scanner.mustache_tags.is_empty());
}
