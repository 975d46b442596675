use std::path::{Path, PathBuf};

use stache_langs::htmlmustache;

use super::lang_resolver::{load_table, resolve_language, suggest_language};
use super::{CliError, LanguageChoice};

fn write_table(bytes: &[u8]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("htmlmustache.stbl");
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}

#[test]
fn table_file_gets_bundled_scanner() {
    let (_dir, path) = write_table(htmlmustache::TABLE);
    let language = load_table(&path).unwrap();

    assert_eq!(language.name(), "htmlmustache");
    assert!(language.has_scanner());
    assert!(!language.same_as(&htmlmustache::language()));
}

#[test]
fn corrupt_table_file() {
    let mut bytes = htmlmustache::TABLE.to_vec();
    bytes.truncate(bytes.len() - 1);
    let (_dir, path) = write_table(&bytes);

    let err = load_table(&path).unwrap_err();
    assert!(matches!(err, CliError::Load { .. }), "{err:?}");
}

#[test]
fn missing_table_file() {
    let err = load_table(Path::new("/nonexistent/table.stbl")).unwrap_err();
    assert!(matches!(err, CliError::Load { .. }), "{err:?}");
}

#[test]
fn language_precedence() {
    let by_name = LanguageChoice {
        lang: Some("mustache".into()),
        grammar: None,
    };
    assert_eq!(resolve_language(&by_name, None).unwrap().name(), "htmlmustache");

    let by_ext = resolve_language(&LanguageChoice::default(), Some(Path::new("a.htm"))).unwrap();
    assert_eq!(by_ext.name(), "htmlmustache");

    let fallback = resolve_language(&LanguageChoice::default(), Some(Path::new("a.txt"))).unwrap();
    assert_eq!(fallback.name(), "htmlmustache");

    let unknown = LanguageChoice {
        lang: Some("cobol".into()),
        grammar: None,
    };
    let err = resolve_language(&unknown, None).unwrap_err();
    assert_eq!(err.to_string(), "unknown language: 'cobol'");
}

#[test]
fn suggests_close_names() {
    assert_eq!(suggest_language("htmlmustach").as_deref(), Some("htmlmustache"));
    assert_eq!(suggest_language("HtmlMustahce").as_deref(), Some("htmlmustache"));
    assert_eq!(suggest_language("python"), None);
}
