use super::types::Error;
use crate::asm::{self, print};
use std::path::Path;

/// Assemble a labeled source file into a bytecode image file.
pub fn assemble_path(out: &Path, input: &Path) -> Result<(), Error> {
    let source = super::read_file(input)?;
    let words = asm::assemble(&source)?;

    super::write_file(out, &print::to_image(&words))
}
