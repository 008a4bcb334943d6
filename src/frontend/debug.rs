use super::types::Error;
use crate::asm::{self, phases};
use crate::vm::{Instance, LogLevel};
use std::path::Path;

/// Load a labeled source file into a fresh machine and single-step it
/// under the interactive debugger, dumping the final state on halt.
pub fn debug_path(input: &Path) -> Result<(), Error> {
    let source = super::read_file(input)?;
    let program = asm::parse_source(&source)?;
    phases::check(&program)?;

    let log_level = LogLevel::default();
    let mut instance = Instance::new(&log_level);
    instance.load_program(program)?;
    instance.enable_debugger()?;
    instance.run()?;
    instance.print_state()?;

    Ok(())
}
