use std::fs;
use std::io::{self, Read};
use std::path::Path;

use super::{CliError, SourceInput};

/// Source text from `-s`, stdin (`-`) or a file.
pub fn load_source(input: &SourceInput) -> Result<String, CliError> {
    match (&input.text, &input.path) {
        (Some(_), Some(_)) => Err(CliError::AmbiguousSource),
        (Some(text), None) => Ok(text.clone()),
        (None, Some(path)) if path.as_os_str() == "-" => load_stdin(),
        (None, Some(path)) => load_file(path),
        (None, None) => Err(CliError::MissingSource),
    }
}

fn load_stdin() -> Result<String, CliError> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(CliError::Stdin)?;
    Ok(buf)
}

pub fn load_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
