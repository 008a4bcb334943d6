use crate::asm::model::{Inst, Item, Program, Value};
use crate::common;
use crate::spec::types::hw::{Word, INST_WORDS, WORD_MAX};
use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    UnresolvedReference(String),
    DuplicateLabel(String),
    OversizedProgram(usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnresolvedReference(name) => {
                write!(f, "Could not find goto destination '{}'", name)
            }
            Error::DuplicateLabel(name) => {
                write!(f, "Found duplicated goto destination '{}'", name)
            }
            Error::OversizedProgram(insts) => write!(
                f,
                "Program has {} instructions, more than the {} addressable",
                insts,
                (WORD_MAX as usize) + 1
            ),
        }
    }
}

/// Position of the first definition of `name`, counted in instructions.
/// Labels, contexts, and section markers occupy no bytecode and are
/// invisible here.
fn label_position(prog: &Program, name: &str) -> Option<usize> {
    let mut pos = 0;
    for item in prog {
        match item {
            Item::Label(label) if label == name => return Some(pos),
            Item::Inst(_) => pos += 1,
            _ => (),
        }
    }
    None
}

fn resolve_value(prog: &Program, value: Option<&Value>) -> Result<Word, Error> {
    match value {
        None => Ok(0),
        Some(Value::Literal(lit)) => Ok(*lit),
        Some(Value::Reference(name)) => match label_position(prog, name) {
            Some(pos) => Ok(pos as Word),
            None => Err(Error::UnresolvedReference(name.to_owned())),
        },
    }
}

/// Encode the program as a flat word image, one `INST_WORDS` quad per
/// instruction, with label references replaced by instruction indices.
pub fn resolve(prog: &Program) -> Result<Vec<Word>, Error> {
    let insts = prog
        .iter()
        .filter_map(|item| match item {
            Item::Inst(inst) => Some(inst),
            _ => None,
        })
        .collect::<Vec<&Inst>>();

    if insts.len() > (WORD_MAX as usize) + 1 {
        return Err(Error::OversizedProgram(insts.len()));
    }

    let mut words = Vec::with_capacity(insts.len() * INST_WORDS);
    for inst in insts {
        let (a, b) = inst.slots();
        words.push(inst.opcode() as Word);
        words.push(resolve_value(prog, a)?);
        words.push(resolve_value(prog, b)?);
        words.push(0);
    }

    Ok(words)
}

/// Validate a program without encoding it: every label is defined at
/// most once, and every reference has a destination.
pub fn check(prog: &Program) -> Result<(), Error> {
    let labels = prog
        .iter()
        .filter_map(|item| match item {
            Item::Label(label) => Some(label),
            _ => None,
        })
        .collect::<Vec<&String>>();

    for (a, b) in common::slice_pairwise_ordered(&labels) {
        if a == b {
            return Err(Error::DuplicateLabel((*a).to_owned()));
        }
    }

    for item in prog {
        if let Item::Inst(inst) = item {
            for value in inst.values() {
                if let Value::Reference(name) = value {
                    if label_position(prog, name).is_none() {
                        return Err(Error::UnresolvedReference(name.to_owned()));
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::model::DebugContext;

    fn label(name: &str) -> Item {
        Item::Label(name.to_owned())
    }

    fn goto(name: &str) -> Item {
        Item::Inst(Inst::GotoOp {
            target: Value::Reference(name.to_owned()),
        })
    }

    #[test]
    fn labels_count_instructions_only() {
        let prog = vec![
            Item::Context(DebugContext::bare("Executable Header")),
            Item::StartSection,
            Item::Inst(Inst::StpCpu),
            label("after_one"),
            Item::Inst(Inst::StpCpu),
            Item::EndSection,
            label("after_two"),
        ];
        assert_eq!(label_position(&prog, "after_one"), Some(1));
        assert_eq!(label_position(&prog, "after_two"), Some(2));
        assert_eq!(label_position(&prog, "missing"), None);
    }

    #[test]
    fn first_definition_wins() {
        let prog = vec![
            label("spot"),
            Item::Inst(Inst::StpCpu),
            label("spot"),
            Item::Inst(Inst::StpCpu),
        ];
        assert_eq!(label_position(&prog, "spot"), Some(0));
    }

    #[test]
    fn resolve_encodes_slot_order() {
        let prog = vec![
            Item::Inst(Inst::SetReg {
                reg: Value::Literal(3),
                val: Value::Literal(7),
            }),
            Item::Inst(Inst::RegRam {
                reg: Value::Literal(2),
                mem: Value::Literal(100),
            }),
            label("end"),
            Item::Inst(Inst::GotoOp {
                target: Value::Reference("end".to_owned()),
            }),
        ];
        assert_eq!(
            resolve(&prog).unwrap(),
            vec![3, 7, 3, 0, 2, 100, 2, 0, 6, 2, 0, 0]
        );
    }

    #[test]
    fn resolve_rejects_unknown_reference() {
        match resolve(&vec![goto("nowhere")]) {
            Err(Error::UnresolvedReference(name)) => assert_eq!(name, "nowhere"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn check_accepts_valid_program() {
        let prog = vec![label("loop"), Item::Inst(Inst::StpCpu), goto("loop")];
        assert!(check(&prog).is_ok());
    }

    #[test]
    fn check_rejects_duplicate_labels() {
        let prog = vec![label("x"), Item::Inst(Inst::StpCpu), label("x")];
        match check(&prog) {
            Err(Error::DuplicateLabel(name)) => assert_eq!(name, "x"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn check_rejects_dangling_reference() {
        match check(&vec![goto("nowhere")]) {
            Err(Error::UnresolvedReference(name)) => assert_eq!(name, "nowhere"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
