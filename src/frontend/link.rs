use super::types::Error;
use crate::asm::{self, model::Program, phases, print};
use crate::sym::compile;
use std::path::{Path, PathBuf};

/// Concatenate assembly units into a library, in argument order.
pub fn lib_link(out: &Path, ins: &[PathBuf]) -> Result<(), Error> {
    let prog = concat_units(ins)?;
    write_checked(out, &prog)
}

/// Link assembly units into an executable: the boot header that calls
/// `main` and halts, followed by the units in argument order.
pub fn exe_link(out: &Path, ins: &[PathBuf]) -> Result<(), Error> {
    let mut prog = compile::executable_header();
    prog.extend(concat_units(ins)?);
    write_checked(out, &prog)
}

fn concat_units(ins: &[PathBuf]) -> Result<Program, Error> {
    let mut prog = Program::new();
    for path in ins {
        let source = super::read_file(path)?;
        prog.extend(asm::parse_source(&source)?);
        log::info!("linked \"{}\"", path.display());
    }

    Ok(prog)
}

fn write_checked(out: &Path, prog: &Program) -> Result<(), Error> {
    phases::check(prog)?;
    super::write_file(out, &print::to_source(prog))
}
