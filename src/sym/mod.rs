pub mod compile;
pub mod model;
pub mod phases;

pub use phases::types::Error;

use model::Unit;

pub fn parse_source(source: &str) -> Result<Unit, Error> {
    let tokens = phases::tokenize(source)?;
    let unit = phases::parse(tokens)?;

    Ok(unit)
}
