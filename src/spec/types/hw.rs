use derive_more::Display;
use enum_map::Enum;
use num_derive::FromPrimitive;
use static_assertions::const_assert;
use strum_macros::EnumIter;

pub type Word = u16;

pub const WORD_WIDTH: usize = 16;
pub const WORD_MAX: Word = 0xFFFF;

/// Every instruction occupies four consecutive words in the bytecode:
/// the opcode, operand slot `a`, operand slot `b`, and a fourth word
/// which is always zero.
pub const INST_WORDS: usize = 4;

pub const NUM_INPUT_REGS: usize = 8;
pub const NUM_OUTPUT_REGS: usize = 3;

/// The twelve machine operations, in numeric encoding order. The
/// `Display` names are exactly the source-form mnemonics.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, FromPrimitive, EnumIter)]
pub enum OpCode {
    StpCpu,
    RamReg,
    RegRam,
    SetReg,
    SetRam,
    RegReg,
    GotoOp,
    CnGoto,
    PrGoto,
    PrRmRg,
    RgPrRm,
    StPrRm,
}

pub const NUM_OPCODES: usize = 12;
const_assert!(OpCode::StPrRm as usize == NUM_OPCODES - 1);

/// The writable input register file, in numeric order. Slot `Frame`
/// holds the current stack frame pointer; slot `Monitor` is the output
/// port watched by the test harness.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, FromPrimitive, Enum, EnumIter)]
pub enum InReg {
    Op0,
    Op1,
    Op2,
    Frame,
    Alu0,
    Alu1,
    AluSel,
    Monitor,
}

const_assert!(InReg::Monitor as usize == NUM_INPUT_REGS - 1);

impl InReg {
    pub fn describe(self) -> &'static str {
        match self {
            InReg::Op0 => "Operation Input #0",
            InReg::Op1 => "Operation Input #1",
            InReg::Op2 => "Operation Input #2",
            InReg::Frame => "Stack Frame Ptr",
            InReg::Alu0 => "ALU Input #0",
            InReg::Alu1 => "ALU Input #1",
            InReg::AluSel => "ALU Mode Select",
            InReg::Monitor => "Output Monitor",
        }
    }
}

/// The read-only derived register file: values computed from the input
/// registers on every read.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, FromPrimitive, EnumIter)]
pub enum OutReg {
    Frame,
    Addr,
    Alu,
}

const_assert!(OutReg::Alu as usize == NUM_OUTPUT_REGS - 1);

impl OutReg {
    pub fn describe(self) -> &'static str {
        match self {
            OutReg::Frame => "Stack Frame Ptr",
            OutReg::Addr => "Abs. Addr of Sel. Addr",
            OutReg::Alu => "ALU Output",
        }
    }
}

/// Operation selected by the `AluSel` input register.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, FromPrimitive, EnumIter)]
pub enum AluMode {
    Add,
    GreaterThan,
    EqualTo,
    LessThan,
}

impl AluMode {
    pub fn describe(self) -> &'static str {
        match self {
            AluMode::Add => "Add",
            AluMode::GreaterThan => "Greater Than",
            AluMode::EqualTo => "Equal To",
            AluMode::LessThan => "Less Than",
        }
    }

    pub fn apply(self, lhs: Word, rhs: Word) -> Word {
        match self {
            AluMode::Add => lhs.wrapping_add(rhs),
            AluMode::GreaterThan => (lhs > rhs) as Word,
            AluMode::EqualTo => (lhs == rhs) as Word,
            AluMode::LessThan => (lhs < rhs) as Word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn opcode_encoding_order() {
        assert_eq!(OpCode::from_u16(0), Some(OpCode::StpCpu));
        assert_eq!(OpCode::from_u16(3), Some(OpCode::SetReg));
        assert_eq!(OpCode::from_u16(8), Some(OpCode::PrGoto));
        assert_eq!(OpCode::from_u16(11), Some(OpCode::StPrRm));
        assert_eq!(OpCode::from_u16(12), None);
    }

    #[test]
    fn opcode_mnemonics() {
        assert_eq!(OpCode::StpCpu.to_string(), "StpCpu");
        assert_eq!(OpCode::PrRmRg.to_string(), "PrRmRg");
    }

    #[test]
    fn alu_modes() {
        assert_eq!(AluMode::Add.apply(0xFFFF, 2), 1);
        assert_eq!(AluMode::GreaterThan.apply(5, 4), 1);
        assert_eq!(AluMode::GreaterThan.apply(4, 5), 0);
        assert_eq!(AluMode::EqualTo.apply(7, 7), 1);
        assert_eq!(AluMode::LessThan.apply(4, 5), 1);
        assert_eq!(AluMode::from_u16(4), None);
    }
}
