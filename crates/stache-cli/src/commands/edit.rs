use std::ops::Range;
use std::str::FromStr;

use stache_lib::{IncrementalStats, ParseOptions, Parser};

use super::lang_resolver::resolve_language;
use super::output::{TreeFormat, render_tree};
use super::parse::report_truncation;
use super::source_loader::load_source;
use super::{CliError, LanguageChoice, SourceInput};

/// One `--edit start:end:text` replacement, in the coordinates of the text
/// the previous edit produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSpec {
    pub range: Range<usize>,
    pub text: String,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditSpecError {
    #[error("expected START:END:TEXT")]
    Shape,
    #[error("invalid offset '{0}'")]
    Offset(String),
    #[error("start {start} is after end {end}")]
    Reversed { start: usize, end: usize },
}

impl FromStr for EditSpec {
    type Err = EditSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(start), Some(end), Some(text)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(EditSpecError::Shape);
        };
        let offset = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| EditSpecError::Offset(part.to_string()))
        };
        let (start, end) = (offset(start)?, offset(end)?);
        if start > end {
            return Err(EditSpecError::Reversed { start, end });
        }
        Ok(Self {
            range: start..end,
            text: unescape(text),
        })
    }
}

/// `\n`, `\t` and `\\` in edit text.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

pub struct EditArgs {
    pub source: SourceInput,
    pub language: LanguageChoice,
    pub options: ParseOptions,
    pub edits: Vec<EditSpec>,
    pub format: TreeFormat,
}

pub fn run(args: EditArgs) -> Result<(), CliError> {
    let source = load_source(&args.source)?;
    let language = resolve_language(&args.language, args.source.path.as_deref())?;
    let parser = Parser::with_options(&language, args.options);

    let mut tree = parser.parse(&source);
    for edit in &args.edits {
        tree = parser.edit(&tree, edit.range.clone(), &edit.text)?;
        eprintln!("{}", describe(edit, &tree.stats()));
    }

    println!("{}", render_tree(&tree, args.format)?);
    report_truncation(&tree);
    Ok(())
}

/// One line of reuse statistics for an applied edit.
pub fn describe(edit: &EditSpec, stats: &IncrementalStats) -> String {
    format!(
        "edit {}..{} {:?}: reused {} nodes and {} leaves ({} bytes), lexed {} leaves ({} bytes), {:.1}% reused",
        edit.range.start,
        edit.range.end,
        edit.text,
        stats.reused_nodes,
        stats.reused_leaves,
        stats.reused_bytes,
        stats.lexed_leaves,
        stats.lexed_bytes,
        stats.reuse_rate() * 100.0,
    )
}
