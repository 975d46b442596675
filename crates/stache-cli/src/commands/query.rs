use stache_lib::{ParseOptions, Parser, Query, QueryCapture, QueryCursor};

use super::lang_resolver::resolve_language;
use super::parse::report_truncation;
use super::source_loader::load_source;
use super::{CliError, LanguageChoice, SourceInput};

pub struct QueryArgs {
    pub source: SourceInput,
    pub language: LanguageChoice,
    pub options: ParseOptions,
    pub query: Option<String>,
    pub color: bool,
}

pub fn run(args: QueryArgs) -> Result<(), CliError> {
    let query_text = args.query.as_deref().ok_or(CliError::MissingQuery)?;
    let source = load_source(&args.source)?;
    let language = resolve_language(&args.language, args.source.path.as_deref())?;

    let query = match Query::new(&language, query_text) {
        Ok(query) => query,
        Err(err) => {
            eprint!(
                "{}",
                err.diagnostics().printer(query_text).colored(args.color).render()
            );
            return Err(CliError::InvalidQuery);
        }
    };

    let tree = Parser::with_options(&language, args.options).parse(&source);
    report_truncation(&tree);
    for capture in QueryCursor::new().captures(&query, tree.root_node()) {
        println!("{}", format_capture(&capture));
    }
    Ok(())
}

/// `@name kind start..end "text"`
pub fn format_capture(capture: &QueryCapture<'_, '_>) -> String {
    let range = capture.node.byte_range();
    format!(
        "@{} {} {}..{} {:?}",
        capture.name,
        capture.node.kind_name(),
        range.start,
        range.end,
        capture.node.text()
    )
}
