//! Rendering diagnostics over their source with annotate-snippets.

use std::fmt::{self, Write};
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::{Diagnostic, Diagnostics, Severity};

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: &'s str,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics, source: &'s str) -> Self {
        Self {
            diagnostics,
            source,
            path: None,
            colored: false,
        }
    }

    /// File name for the `-->` line.
    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out).expect("writing to a String cannot fail");
        out
    }

    /// Reports separated by blank lines.
    pub fn write_to(&self, w: &mut impl Write) -> fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        for (index, diagnostic) in self.diagnostics.iter().enumerate() {
            if index > 0 {
                w.write_char('\n')?;
            }
            let report = [self.group(diagnostic)];
            write!(w, "{}", renderer.render(&report))?;
        }
        Ok(())
    }

    fn group<'a>(&'a self, diagnostic: &'a Diagnostic) -> Group<'a> {
        // The title already carries the message, so the carets stay unlabeled.
        let primary = AnnotationKind::Primary.span(self.visible_span(diagnostic.range));
        let mut snippet = Snippet::source(self.source).line_start(1).annotation(primary);
        if let Some(context) = &diagnostic.context {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(self.visible_span(context.range))
                    .label(&context.text),
            );
        }
        if let Some(path) = self.path {
            snippet = snippet.path(path);
        }

        let level = match diagnostic.severity {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARNING,
        };
        level.primary_title(&diagnostic.message).element(snippet)
    }

    /// `range` clamped to the source. An empty range covers the character
    /// after it, if any.
    fn visible_span(&self, range: TextRange) -> Range<usize> {
        let len = self.source.len();
        let start = usize::from(range.start()).min(len);
        let end = usize::from(range.end()).clamp(start, len);
        if end > start {
            return start..end;
        }
        let next = self
            .source
            .get(start..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        start..start + next
    }
}
