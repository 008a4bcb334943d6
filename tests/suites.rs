mod common;

use symtool::cli::suite;

#[test]
fn builtin_regression_suite_passes() {
    assert!(suite::run_suite());
}

#[test]
#[cfg_attr(not(feature = "big_tests"), ignore)]
fn deep_recursion_grows_memory_without_faulting() {
    common::run_expecting(
        "void down(byte n){
    if(n){
        setReg(4, n);
        setReg(5, 0xFFFF);
        setReg(6, 0);
        byte m;
        m = getReg(2);
        down(m);
    }
}

void main(){
    down(2000);
    setReg(7, 42);
}
",
        &[42],
    )
    .unwrap();
}
