use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

fn single(diagnostic: Diagnostic) -> Diagnostics {
    [diagnostic].into_iter().collect()
}

#[test]
fn counts_by_severity() {
    let diagnostics: Diagnostics = [
        Diagnostic::error(range(0, 1), "a"),
        Diagnostic::warning(range(1, 2), "b"),
        Diagnostic::error(range(2, 3), "c"),
    ]
    .into_iter()
    .collect();

    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics.error_count(), 2);
    assert!(diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
}

#[test]
fn warnings_alone_are_not_errors() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.push(Diagnostic::warning(
        TextRange::empty(3.into()),
        "parse stopped early",
    ));

    assert!(diagnostics.has_warnings());
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.error_count(), 0);
}

#[test]
fn display_with_context() {
    let diagnostic = Diagnostic::error(range(3, 5), "unexpected `>`")
        .with_context(range(0, 9), "inside start_tag");

    insta::assert_snapshot!(diagnostic.to_string(), @"error at 3..5: unexpected `>` (inside start_tag at 0..9)");
    insta::assert_snapshot!(Severity::Warning.to_string(), @"warning");
}

#[test]
fn render_with_context() {
    let diagnostics =
        single(Diagnostic::error(range(0, 5), "primary").with_context(range(6, 10), "inside list"));

    insta::assert_snapshot!(diagnostics.render("hello world!"), @r"
    error: primary
      |
    1 | hello world!
      | ^^^^^ ---- inside list
    ");
}

#[test]
fn render_with_path() {
    let diagnostics = single(Diagnostic::error(range(0, 5), "test error"));

    let result = diagnostics.printer("hello world").path("page.html").render();
    insta::assert_snapshot!(result, @r"
    error: test error
     --> page.html:1:1
      |
    1 | hello world
      | ^^^^^
    ");
}

#[test]
fn empty_range_covers_next_char() {
    let diagnostics = single(Diagnostic::error(TextRange::empty(0.into()), "zero width error"));

    insta::assert_snapshot!(diagnostics.render("hello"), @r"
    error: zero width error
      |
    1 | hello
      | ^
    ");
}

#[test]
fn render_warning() {
    let diagnostics = single(Diagnostic::warning(range(6, 11), "parse stopped early"));

    insta::assert_snapshot!(diagnostics.render("hello world"), @r"
    warning: parse stopped early
      |
    1 | hello world
      |       ^^^^^
    ");
}

#[test]
fn reports_are_separated() {
    let diagnostics: Diagnostics = [
        Diagnostic::error(range(0, 5), "first error"),
        Diagnostic::error(range(6, 10), "second error"),
    ]
    .into_iter()
    .collect();

    insta::assert_snapshot!(diagnostics.render("hello world!"), @r"
    error: first error
      |
    1 | hello world!
      | ^^^^^

    error: second error
      |
    1 | hello world!
      |       ^^^^
    ");
}

#[test]
fn nothing_to_render() {
    assert!(Diagnostics::new().render("source").is_empty());
}

#[test]
fn colored_output() {
    let diagnostics = single(Diagnostic::error(range(0, 5), "test"));

    let result = diagnostics.printer("hello").colored(true).render();
    assert!(result.contains("test"));
    assert!(result.contains('\x1b'));
}

#[test]
fn range_past_end_is_clamped() {
    let diagnostics = single(Diagnostic::error(TextRange::empty(40.into()), "late"));
    assert!(diagnostics.render("hello").starts_with("error: late"));
}

#[test]
fn extend_appends() {
    let mut diagnostics = single(Diagnostic::error(range(0, 1), "a"));
    diagnostics.extend([Diagnostic::warning(range(1, 2), "b")]);

    let messages: Vec<_> = (&diagnostics).into_iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, ["a", "b"]);
}
