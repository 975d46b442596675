use std::fs;
use std::path::PathBuf;

use stache_core::{Grammar, format};

use super::CliError;
use super::source_loader::load_file;

pub struct CompileArgs {
    pub grammar_path: PathBuf,
    pub output: Option<PathBuf>,
}

pub fn run(args: CompileArgs) -> Result<(), CliError> {
    let json = load_file(&args.grammar_path)?;
    let grammar = Grammar::from_json(&json)?;
    let table = stache_compiler::compile(&grammar)?;
    let bytes = format::encode(&table).map_err(|err| CliError::Encode(err.to_string()))?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.stbl", table.name)));
    fs::write(&output, &bytes).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;

    eprintln!(
        "compiled '{}': {} symbols, {} states, {} bytes -> {}",
        table.name,
        table.symbols.len(),
        table.states.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}
