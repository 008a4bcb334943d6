//! The built-in regression suite behind `automated-test`: a fixed set
//! of source programs run against their expected output-monitor
//! queues, including cases the machine must reject.

use ansi_term::Color::{Green, Red};
use derive_more::Constructor;
use once_cell::sync::Lazy;

use crate::asm::{self, phases};
use crate::frontend::Error;
use crate::spec::types::hw::Word;
use crate::sym::{self, compile};
use crate::vm::{Instance, LogLevel};

enum Source {
    Asm(&'static str),
    Sym(&'static str),
}

impl Source {
    fn build(&self) -> Result<Vec<Word>, Error> {
        let prog = match self {
            Source::Asm(text) => asm::parse_source(text)?,
            Source::Sym(text) => {
                let unit = sym::parse_source(text)?;
                let mut prog = compile::executable_header();
                prog.extend(compile::lower(&unit, "<builtin>")?);
                prog
            }
        };

        phases::check(&prog)?;
        Ok(phases::resolve(&prog)?)
    }
}

#[derive(Constructor)]
struct Case {
    name: &'static str,
    source: Source,
    expected: &'static [Word],
    must_fault: bool,
}

impl Case {
    fn run(&self) -> Result<(), Error> {
        let image = self.source.build()?;

        let log_level = LogLevel::default();
        let mut instance = Instance::new(&log_level);
        instance.load_image(image);
        instance.expect_output(self.expected.to_vec());
        instance.run()?;

        Ok(())
    }

    fn check(&self) -> (bool, String) {
        match (self.must_fault, self.run()) {
            (false, Ok(())) => (true, format!("{}", Green.bold().paint("PASS"))),
            (true, Err(_)) => (
                true,
                format!("{} (rejected as required)", Green.bold().paint("PASS")),
            ),
            (false, Err(err)) => (false, format!("{}: {}", Red.bold().paint("FAIL"), err)),
            (true, Ok(())) => (
                false,
                format!(
                    "{}: expected the machine to reject this case",
                    Red.bold().paint("FAIL")
                ),
            ),
        }
    }
}

pub fn run_suite() -> bool {
    let cases = &*CASES;
    let name_pad = cases.iter().map(|case| case.name.len()).max().unwrap_or(0);

    println!("Running suite: 'regression' ({} cases)", cases.len());
    println!("{:-<line_len$}", "", line_len = name_pad + 45);

    let passes = cases
        .iter()
        .enumerate()
        .filter(|(num, case)| run_case(case, num + 1, name_pad))
        .count();
    let success = passes == cases.len();

    println!("{:-<line_len$}", "", line_len = name_pad + 45);
    println!(
        "Suite Result: {}, {}/{} passes",
        if success {
            Green.bold().paint("SUCCESS")
        } else {
            Red.bold().paint("FAILED")
        },
        passes,
        cases.len()
    );

    success
}

fn run_case(case: &Case, num: usize, name_pad: usize) -> bool {
    let (success, msg) = case.check();

    println!(
        "Case {:2}: {} {}{}",
        num,
        case.name,
        " ".repeat(name_pad - case.name.len()),
        msg
    );

    success
}

static CASES: Lazy<Vec<Case>> = Lazy::new(|| {
    vec![
        Case::new(
            "cpuSimulatorTester",
            Source::Asm(SIMULATOR_TESTER),
            &[1, 2, 42, 42, 65535, 35],
            false,
        ),
        Case::new(
            "cpuSimulatorTesterMismatch",
            Source::Asm(SIMULATOR_TESTER_MISMATCH),
            &[1, 2, 3, 4, 5],
            true,
        ),
        Case::new(
            "cpuSimulatorTesterShortfall",
            Source::Asm(SIMULATOR_TESTER_SHORTFALL),
            &[1, 2, 3, 4, 5],
            true,
        ),
        Case::new(
            "cpuSimulatorTesterOverflow",
            Source::Asm(SIMULATOR_TESTER_OVERFLOW),
            &[1, 2, 3, 4, 5],
            true,
        ),
        Case::new(
            "basicAsm",
            Source::Asm(BASIC_ASM),
            &[1, 2, 42, 42, 65535, 35],
            false,
        ),
        Case::new(
            "basicSym",
            Source::Sym(BASIC_SYM),
            &[1, 2, 42, 42, 65535, 35],
            false,
        ),
        Case::new(
            "functionCall",
            Source::Sym(FUNCTION_CALL),
            &[1, 35, 42, 45, 42, 65535, 42],
            false,
        ),
        Case::new(
            "variableScope",
            Source::Sym(VARIABLE_SCOPE),
            &[1, 2, 3, 4, 5],
            false,
        ),
        Case::new(
            "functionReturnValue",
            Source::Sym(FUNCTION_RETURN_VALUE),
            &[1, 1, 2, 3],
            false,
        ),
        Case::new(
            "decrementTest",
            Source::Sym(DECREMENT),
            &[4, 3, 2, 1, 0],
            false,
        ),
        Case::new(
            "forLoopTest",
            Source::Sym(FOR_LOOP),
            &[5, 4, 3, 2, 1],
            false,
        ),
        Case::new(
            "factorialTest",
            Source::Sym(FACTORIAL),
            &[1, 1, 2, 6, 24, 120, 720, 5040],
            false,
        ),
    ]
});

const SIMULATOR_TESTER: &str = "\
SetReg 7 1
SetReg 7 2
SetReg 7 42
SetReg 7 42
SetReg 7 65535
SetReg 4 35
SetReg 5 0
SetReg 6 0
RegReg 2 7
StpCpu
";

const SIMULATOR_TESTER_MISMATCH: &str = "\
SetReg 7 1
SetReg 7 2
SetReg 7 3
SetReg 7 3
SetReg 7 5
StpCpu
";

const SIMULATOR_TESTER_SHORTFALL: &str = "\
SetReg 7 1
SetReg 7 2
SetReg 7 3
SetReg 7 4
StpCpu
";

const SIMULATOR_TESTER_OVERFLOW: &str = "\
SetReg 7 1
SetReg 7 2
SetReg 7 3
SetReg 7 4
SetReg 7 5
SetReg 7 6
StpCpu
";

const BASIC_ASM: &str = "\
SetReg 7 0x1
SetReg 7 0b10
SetReg 7 42
SetReg 7 42
SetReg 7 0xFFFF
SetReg 4 0x23
SetReg 5 0
SetReg 0b110 0
RegReg 2 7
StpCpu
";

const BASIC_SYM: &str = "\
void main(){
    setReg(7, 1);
    setReg(7, 2);
    setReg(7, 42);
    byte output;
    output = 42;
    setReg(7, output);
    setReg(7, 65535);
    setReg(4, 35);
    setReg(5, 0);
    setReg(6, 0);
    output = getReg(2);
    setReg(7, output);
}
";

const FUNCTION_CALL: &str = "\
void foo(){
    setReg(7, 1);
}

void bar(byte input){
    setReg(7, input);
}

void foobar(byte input){
    setReg(7, input);
    setReg(7, 42);
}

void main(){
    byte input;
    input = 42;
    foo();
    bar(35);
    bar(input);
    input = 65535;
    foobar(45);
    foobar(input);
}
";

const VARIABLE_SCOPE: &str = "\
void bar(byte a){
    a = 4;
    setReg(7, a);
}

void main(){
    if(1){
        byte a;
        a = 1;
        setReg(7, a);
    }
    while(1){
        byte a;
        a = 2;
        setReg(7, 2);
        break;
    }
    byte a;
    a = 3;
    setReg(7, a);
    a = 5;
    bar(a);
    setReg(7, a);
}
";

const FUNCTION_RETURN_VALUE: &str = "\
byte foo(){
    byte a;
    a = 1;
    setReg(7, a);
    return a;
}

byte foo(byte bar){
    setReg(7, bar);
    bar = 3;
    return bar;
}

void main(){
    byte a;
    a = foo();
    setReg(7, a);
    a = 2;
    a = foo(a);
    setReg(7, a);
}
";

const DECREMENT: &str = "\
byte decrement(byte bar){
    setReg(4, bar);
    setReg(5, 0xFFFF);
    setReg(6, 0);
    bar = getReg(2);
    return bar;
}

void main(){
    byte a;
    a = 5;
    a = decrement(a);
    setReg(7, a);
    a = decrement(a);
    setReg(7, a);
    a = decrement(a);
    setReg(7, a);
    a = decrement(a);
    setReg(7, a);
    a = decrement(a);
    setReg(7, a);
}
";

const FOR_LOOP: &str = "\
void main(){
    setReg(6, 0);
    setReg(5, 0xFFFF);
    byte a;
    a = 5;
    while(a){
        setReg(7, a);

        setReg(4, a);
        a = getReg(2);
    }
    if(a){
        setReg(7, 1337);
    }
}
";

const FACTORIAL: &str = "\
byte add(byte a, byte b){
    setReg(4, a);
    setReg(5, b);
    setReg(6, 0);
    byte c;
    c = getReg(2);
    return c;
}

byte multiply(byte a, byte b){
    byte output;
    output = 0;
    setReg(6, 0);
    while(a){
        setReg(4, output);
        setReg(5, b);
        output = getReg(2);

        setReg(4, a);
        setReg(5, 0xFFFF);
        a = getReg(2);
    }
    return output;
}

byte factorial(byte a){
    if(a){
        byte output;
        byte last;
        last = add(a, 0xFFFF);
        last = factorial(last);
        output = multiply(a, last);
        return output;
    }
    return 1;
}

void main(){
    byte answer;
    answer = factorial(0);
    setReg(7, answer);
    answer = factorial(1);
    setReg(7, answer);
    answer = factorial(2);
    setReg(7, answer);
    answer = factorial(3);
    setReg(7, answer);
    answer = factorial(4);
    setReg(7, answer);
    answer = factorial(5);
    setReg(7, answer);
    answer = factorial(6);
    setReg(7, answer);
    answer = factorial(7);
    setReg(7, answer);
}
";
