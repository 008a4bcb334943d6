pub mod model;
pub mod phases;
pub mod print;

pub use phases::types::Error;

use crate::spec::types::hw::Word;
use model::Program;

pub fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = phases::tokenize(source)?;
    let prog = phases::parse(tokens)?;

    Ok(prog)
}

/// Parse, validate, and encode a source text into a flat word image.
pub fn assemble(source: &str) -> Result<Vec<Word>, Error> {
    let prog = parse_source(source)?;
    phases::check(&prog)?;
    let words = phases::resolve(&prog)?;

    Ok(words)
}
