mod common;

use symtool::frontend::Error;
use symtool::vm;

#[test]
fn calling_convention_round_trip() {
    common::run_expecting(
        "byte id(byte x){
    return x;
}

void main(){
    byte a;
    a = id(5);
    setReg(7, a);
}
",
        &[5],
    )
    .unwrap();
}

#[test]
fn alu_modes_follow_the_selector() {
    common::run_expecting(
        "void main(){
    byte r;
    setReg(4, 5);
    setReg(5, 3);
    setReg(6, 0);
    r = getReg(2);
    setReg(7, r);
    setReg(6, 1);
    r = getReg(2);
    setReg(7, r);
    setReg(6, 2);
    r = getReg(2);
    setReg(7, r);
    setReg(6, 3);
    r = getReg(2);
    setReg(7, r);
}
",
        &[8, 1, 0, 0],
    )
    .unwrap();
}

const COUNTER: &str = "void main(){ setReg(7, 1); setReg(7, 2); setReg(7, 3); }\n";

#[test]
fn monitor_passes_only_the_exact_queue() {
    common::run_expecting(COUNTER, &[1, 2, 3]).unwrap();

    match common::run_expecting(COUNTER, &[1, 2]) {
        Err(Error::Vm(vm::Error::MonitorOverflow)) => (),
        other => panic!("unexpected result: {:?}", other),
    }

    match common::run_expecting(COUNTER, &[1, 2, 3, 4]) {
        Err(Error::Vm(vm::Error::MonitorShortfall)) => (),
        other => panic!("unexpected result: {:?}", other),
    }

    match common::run_expecting(COUNTER, &[1, 2, 4]) {
        Err(Error::Vm(vm::Error::MonitorMismatch {
            expected: 4,
            got: 3,
        })) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn end_to_end_add_writes_exactly_the_sum() {
    common::run_expecting(
        "byte add(byte a, byte b){
    setReg(4, a);
    setReg(5, b);
    setReg(6, 0);
    byte c;
    c = getReg(2);
    return c;
}

void main(){
    byte r;
    r = add(2, 3);
    setReg(7, r);
}
",
        &[5],
    )
    .unwrap();
}

// Falling off the end of a value-returning function is left undefined
// at runtime; the compiler must still accept it.
#[test]
fn value_function_without_return_still_compiles() {
    common::build_executable(
        "byte stray(){
    setReg(4, 1);
}

void main(){
}
",
    )
    .unwrap();
}
