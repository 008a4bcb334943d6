use symtool::asm::phases;
use symtool::frontend::Error;
use symtool::spec::types::hw::Word;
use symtool::sym::{self, compile};
use symtool::vm::{Instance, LogLevel};

pub fn build_executable(source: &str) -> Result<Vec<Word>, Error> {
    let unit = sym::parse_source(source)?;
    let mut prog = compile::executable_header();
    prog.extend(compile::lower(&unit, "test.sym")?);

    phases::check(&prog)?;
    Ok(phases::resolve(&prog)?)
}

pub fn run_expecting(source: &str, expected: &[Word]) -> Result<(), Error> {
    let image = build_executable(source)?;

    let log_level = LogLevel::default();
    let mut instance = Instance::new(&log_level);
    instance.load_image(image);
    instance.expect_output(expected.to_vec());
    instance.run()?;

    Ok(())
}
