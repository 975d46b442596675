use super::*;

#[test]
fn lang_from_name() {
    assert_eq!(from_name("htmlmustache").unwrap().name(), "htmlmustache");
    assert_eq!(from_name("Mustache").unwrap().name(), "htmlmustache");
    assert!(from_name("unknown").is_none());
}

#[test]
fn lang_from_extension() {
    assert_eq!(from_ext("mustache").unwrap().name(), "htmlmustache");
    assert_eq!(from_ext("HTML").unwrap().name(), "htmlmustache");
    assert!(from_ext("rs").is_none());
}

#[test]
fn scanner_for_table_name() {
    let factory = scanner_for("htmlmustache").unwrap();
    let language =
        stache_lib::Language::from_bytes(htmlmustache::TABLE, Some(factory)).unwrap();
    assert!(language.has_scanner());
    assert!(scanner_for("html").is_none());
}

#[test]
fn all_returns_bundled_langs() {
    let langs = all();
    assert_eq!(langs.len(), 1);
    for lang in &langs {
        assert!(!lang.name().is_empty());
        assert!(lang.has_scanner());
    }
}

#[test]
fn handles_are_shared() {
    assert!(htmlmustache::language().same_as(&from_name("html").unwrap()));
}
