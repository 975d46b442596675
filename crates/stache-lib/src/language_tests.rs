use std::io::Write;

use stache_core::format::encode;

use crate::test_utils::{self, ARITHMETIC, BLOCKS};
use crate::{FORMAT_VERSION, Language, LoadError, Parser};

fn table_file(json: &str) -> tempfile::NamedTempFile {
    let bytes = encode(&test_utils::compile(json)).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file
}

#[test]
fn load_from_path() {
    let file = table_file(ARITHMETIC);
    let language = Language::from_path(file.path(), None).unwrap();

    assert_eq!(language.name(), "arith");
    assert_eq!(language.version(), FORMAT_VERSION);
    assert!(!language.has_scanner());
    let tree = Parser::new(&language).parse("1 + 2;");
    assert_eq!(tree.to_sexp(), "(program (statement (expr (expr (number)) (expr (number)))))");
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Language::from_path(dir.path().join("absent.stbl"), None).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)), "{err:?}");
}

#[test]
fn externals_need_a_scanner() {
    let file = table_file(BLOCKS);
    let err = Language::from_path(file.path(), None).unwrap_err();
    assert!(matches!(err, LoadError::MissingScanner { externals: 3 }), "{err:?}");
}

#[test]
fn symbols() {
    let language = test_utils::arithmetic();
    let expr = language.symbol_for_name("expr", true).unwrap();
    let plus = language.symbol_for_name("+", false).unwrap();

    assert_eq!(language.symbol_name(expr), "expr");
    assert!(language.is_named(expr));
    assert!(language.is_visible(plus));
    assert!(!language.is_named(plus));
    assert!(language.symbol_for_name("expr", false).is_none());
    assert!(language.symbol_count() > 2);
}

#[test]
fn handles_share_the_grammar() {
    let language = test_utils::arithmetic();
    let clone = language.clone();
    assert!(language.same_as(&clone));
    assert!(!language.same_as(&test_utils::arithmetic()));
    assert!(format!("{language:?}").starts_with(r#"Language { name: "arith", version: 1,"#));
}
