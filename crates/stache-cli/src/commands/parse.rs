use stache_lib::{ParseOptions, Parser, Tree};

use super::lang_resolver::resolve_language;
use super::output::{TreeFormat, render_tree};
use super::source_loader::load_source;
use super::{CliError, LanguageChoice, SourceInput};

pub struct ParseArgs {
    pub source: SourceInput,
    pub language: LanguageChoice,
    pub options: ParseOptions,
    pub format: TreeFormat,
    pub diagnostics: bool,
    pub color: bool,
}

pub fn run(args: ParseArgs) -> Result<(), CliError> {
    let source = load_source(&args.source)?;
    let language = resolve_language(&args.language, args.source.path.as_deref())?;
    let tree = Parser::with_options(&language, args.options).parse(&source);

    println!("{}", render_tree(&tree, args.format)?);
    report_truncation(&tree);

    if args.diagnostics && tree.has_error() {
        let diagnostics = tree.diagnostics();
        let path = args
            .source
            .path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());
        let mut printer = diagnostics.printer(&source).colored(args.color);
        if let Some(path) = &path {
            printer = printer.path(path);
        }
        eprint!("{}", printer.render());
        return Err(CliError::SyntaxErrors(diagnostics.error_count().max(1)));
    }

    Ok(())
}

pub fn report_truncation(tree: &Tree) {
    if let Some(exceeded) = tree.truncation() {
        eprintln!("warning: {exceeded}; the tree covers bytes 0..{}", exceeded.bytes);
    }
}
