use std::path::PathBuf;

use stache_lib::Language;

use super::CliError;
use super::lang_resolver::load_table;

pub struct InfoArgs {
    pub table_path: Option<PathBuf>,
}

pub fn run(args: InfoArgs) -> Result<(), CliError> {
    match &args.table_path {
        Some(path) => print!("{}", describe(&load_table(path)?)),
        None => {
            let langs = stache_langs::all();
            println!("Bundled languages ({}):", langs.len());
            for lang in langs {
                print!("{}", describe(&lang));
            }
        }
    }
    Ok(())
}

pub fn describe(language: &Language) -> String {
    let table = language.table();
    format!(
        "{}\n  format version: {}\n  symbols: {}\n  states: {}\n  productions: {}\n  external tokens: {}\n",
        language.name(),
        language.version(),
        language.symbol_count(),
        language.state_count(),
        table.productions.len(),
        table.externals.len(),
    )
}
