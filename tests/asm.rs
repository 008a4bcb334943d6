use symtool::asm::{self, phases::resolve, print, Error};

#[test]
fn label_references_resolve_to_instruction_indices() {
    let image = asm::assemble("GotoOp #end\nSetReg 0 1\nend:\nStpCpu\n").unwrap();
    assert_eq!(image, vec![6, 2, 0, 0, 3, 1, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn zero_width_items_never_shift_addresses() {
    let plain = asm::assemble("GotoOp #end\nSetReg 0 1\nend:\nStpCpu\n").unwrap();
    let noisy = asm::assemble(
        "[ \"boot\" ]\n\
         {\n\
         GotoOp #end\n\
         [ \"byte x;\" \"main.sym\":2 { \"x\":3 } 4 ]\n\
         SetReg 0 1\n\
         }\n\
         end:\n\
         StpCpu\n",
    )
    .unwrap();

    assert_eq!(plain, noisy);
}

#[test]
fn duplicate_labels_are_rejected_wherever_they_sit() {
    for source in &[
        "dup:\nStpCpu\ndup:\nStpCpu\n",
        "dup:\ndup:\nStpCpu\n",
        "StpCpu\ndup:\nStpCpu\ndup:\n",
    ] {
        match asm::assemble(source) {
            Err(Error::Resolve(resolve::Error::DuplicateLabel(name))) => assert_eq!(name, "dup"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
fn dangling_references_are_rejected() {
    match asm::assemble("GotoOp #nowhere\nStpCpu\n") {
        Err(Error::Resolve(resolve::Error::UnresolvedReference(name))) => {
            assert_eq!(name, "nowhere")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn printed_source_parses_back_identically() {
    let source = "\
__function__void__main:
{
    [ \"void main(){\" { \"x\":2 } 3 ]
    RegReg 0 1
    SetReg 2 0
    CnGoto #__function__void__main
}
";
    let prog = asm::parse_source(source).unwrap();
    let reparsed = asm::parse_source(&print::to_source(&prog)).unwrap();

    assert_eq!(prog, reparsed);
}

#[test]
fn assembled_image_renders_in_the_rom_format() {
    let words = asm::assemble("SetReg 7 255\nStpCpu\n").unwrap();
    assert_eq!(print::to_image(&words), "v2.0 raw\n3 ff 7 0 0 0 0 0 ");
}
