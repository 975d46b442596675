use stache_lib::IncrementalStats;

use super::edit::{EditSpec, EditSpecError, describe};

fn spec(s: &str) -> Result<EditSpec, EditSpecError> {
    s.parse()
}

#[test]
fn parses_edit_spec() {
    assert_eq!(
        spec("20:24:user"),
        Ok(EditSpec {
            range: 20..24,
            text: "user".into()
        })
    );
    assert_eq!(spec("3:3:").map(|e| e.text), Ok(String::new()));
    assert_eq!(spec("0:1:a:b").map(|e| e.text), Ok("a:b".to_string()));
}

#[test]
fn unescapes_text() {
    assert_eq!(spec(r"0:0:a\nb").map(|e| e.text), Ok("a\nb".to_string()));
    assert_eq!(spec(r"0:0:\t\\").map(|e| e.text), Ok("\t\\".to_string()));
    assert_eq!(spec(r"0:0:\x").map(|e| e.text), Ok(r"\x".to_string()));
}

#[test]
fn rejects_bad_specs() {
    assert_eq!(spec("3"), Err(EditSpecError::Shape));
    assert_eq!(spec("3:4"), Err(EditSpecError::Shape));
    assert_eq!(spec("a:4:x"), Err(EditSpecError::Offset("a".into())));
    assert_eq!(spec("5:4:x"), Err(EditSpecError::Reversed { start: 5, end: 4 }));
}

#[test]
fn describes_reuse() {
    let edit = EditSpec {
        range: 20..24,
        text: "user".into(),
    };
    let stats = IncrementalStats {
        reused_nodes: 2,
        reused_leaves: 5,
        reused_bytes: 30,
        lexed_leaves: 1,
        lexed_bytes: 10,
    };
    insta::assert_snapshot!(describe(&edit, &stats), @r#"edit 20..24 "user": reused 2 nodes and 5 leaves (30 bytes), lexed 1 leaves (10 bytes), 75.0% reused"#);
}
