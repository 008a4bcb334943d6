use super::imports;
use super::types::Error;
use crate::asm::model::Program;
use crate::asm::print;
use crate::sym::compile;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Lower a structured source file into a labeled instruction program,
/// with its imports resolved first.
pub fn lower_path(path: &Path) -> Result<Program, Error> {
    let unit = imports::load_unit(path)?;
    let prog = compile::lower(&unit, &path.to_string_lossy())?;

    Ok(prog)
}

/// The sibling file a compiled unit is written to.
pub fn output_path(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(".asm");
    PathBuf::from(name)
}

/// Compile one source file, writing the result next to it. Returns the
/// path written.
pub fn compile_path(input: &Path) -> Result<PathBuf, Error> {
    let prog = lower_path(input)?;

    let out = output_path(input);
    super::write_file(&out, &print::to_source(&prog))?;

    Ok(out)
}
