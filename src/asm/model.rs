use crate::spec::types::hw::{OpCode, Word};
use derive_more::Constructor;
use std::fmt::Display;

/// An instruction operand: either an immediate word or a reference to
/// a label, replaced by that label's instruction index at assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Literal(Word),
    Reference(String),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Literal(lit) => write!(f, "{}", lit),
            Value::Reference(name) => write!(f, "#{}", name),
        }
    }
}

/// An instruction, with operands in source order. Note that source
/// order and encoded slot order disagree for some mnemonics (see
/// [`Inst::slots`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    StpCpu,
    RamReg { mem: Value, reg: Value },
    RegRam { reg: Value, mem: Value },
    SetReg { reg: Value, val: Value },
    SetRam { mem: Value, val: Value },
    RegReg { from: Value, to: Value },
    GotoOp { target: Value },
    CnGoto { target: Value },
    PrGoto,
    PrRmRg { reg: Value },
    RgPrRm { reg: Value },
    StPrRm,
}

impl Inst {
    pub fn opcode(&self) -> OpCode {
        match self {
            Inst::StpCpu => OpCode::StpCpu,
            Inst::RamReg { .. } => OpCode::RamReg,
            Inst::RegRam { .. } => OpCode::RegRam,
            Inst::SetReg { .. } => OpCode::SetReg,
            Inst::SetRam { .. } => OpCode::SetRam,
            Inst::RegReg { .. } => OpCode::RegReg,
            Inst::GotoOp { .. } => OpCode::GotoOp,
            Inst::CnGoto { .. } => OpCode::CnGoto,
            Inst::PrGoto => OpCode::PrGoto,
            Inst::PrRmRg { .. } => OpCode::PrRmRg,
            Inst::RgPrRm { .. } => OpCode::RgPrRm,
            Inst::StPrRm => OpCode::StPrRm,
        }
    }

    /// Operand slots `a` and `b` of the encoded word quad. `SetReg` and
    /// `RegRam` swap their source operands into slot order here.
    pub fn slots(&self) -> (Option<&Value>, Option<&Value>) {
        match self {
            Inst::StpCpu | Inst::PrGoto | Inst::StPrRm => (None, None),
            Inst::RamReg { mem, reg } => (Some(mem), Some(reg)),
            Inst::RegRam { reg, mem } => (Some(mem), Some(reg)),
            Inst::SetReg { reg, val } => (Some(val), Some(reg)),
            Inst::SetRam { mem, val } => (Some(mem), Some(val)),
            Inst::RegReg { from, to } => (Some(from), Some(to)),
            Inst::GotoOp { target } | Inst::CnGoto { target } => (Some(target), None),
            Inst::PrRmRg { reg } | Inst::RgPrRm { reg } => (Some(reg), None),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        let (a, b) = self.slots();
        a.into_iter().chain(b)
    }
}

impl Display for Inst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode())?;
        match self {
            Inst::StpCpu | Inst::PrGoto | Inst::StPrRm => Ok(()),
            Inst::RamReg { mem, reg } => write!(f, " {} {}", mem, reg),
            Inst::RegRam { reg, mem } => write!(f, " {} {}", reg, mem),
            Inst::SetReg { reg, val } => write!(f, " {} {}", reg, val),
            Inst::SetRam { mem, val } => write!(f, " {} {}", mem, val),
            Inst::RegReg { from, to } => write!(f, " {} {}", from, to),
            Inst::GotoOp { target } | Inst::CnGoto { target } => write!(f, " {}", target),
            Inst::PrRmRg { reg } | Inst::RgPrRm { reg } => write!(f, " {}", reg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct SourceLine {
    pub file: String,
    pub line: Word,
}

/// Debugger metadata attached just before an instruction sequence: the
/// statement text it was generated from, where that statement lives,
/// the stack variables in scope (name, frame offset) and the frame
/// size at that point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DebugContext {
    pub description: String,
    pub source: Option<SourceLine>,
    pub variables: Vec<(String, Word)>,
    pub frame_size: Option<Word>,
}

impl DebugContext {
    pub fn bare(description: impl Into<String>) -> DebugContext {
        DebugContext {
            description: description.into(),
            ..DebugContext::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Label(String),
    Inst(Inst),
    Context(DebugContext),
    StartSection,
    EndSection,
}

/// Only `Inst` items occupy bytecode positions; labels, contexts, and
/// section markers are invisible to label resolution and the encoder.
pub type Program = Vec<Item>;
