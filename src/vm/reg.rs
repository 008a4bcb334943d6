use enum_map::EnumMap;
use num_traits::FromPrimitive;

use super::types::{Error, LogLevel};
use crate::spec::types::hw::{AluMode, InReg, OutReg, Word};

/// The eight writable input registers plus the three derived output
/// registers, which are recomputed from the inputs on every read.
pub struct Reg<'a> {
    log_level: &'a LogLevel,
    inputs: EnumMap<InReg, Word>,
}

impl<'a> Reg<'a> {
    pub fn new(log_level: &LogLevel) -> Reg {
        Reg {
            log_level,
            inputs: EnumMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.inputs = EnumMap::new();
    }

    pub fn input(&self, reg: InReg) -> Word {
        self.inputs[reg]
    }

    pub fn write(&mut self, reg: InReg, val: Word) {
        if self.log_level.internals {
            println!("  reg {} <- {:04x}", reg, val);
        }

        self.inputs[reg] = val;
    }

    /// The absolute memory address selected by `Op0 + Op1`.
    pub fn selected_address(&self) -> Word {
        self.inputs[InReg::Op0].wrapping_add(self.inputs[InReg::Op1])
    }

    pub fn read(&self, reg: OutReg) -> Result<Word, Error> {
        let val = match reg {
            OutReg::Frame => self.inputs[InReg::Frame],
            OutReg::Addr => self.selected_address(),
            OutReg::Alu => {
                let sel = self.inputs[InReg::AluSel];
                let mode = AluMode::from_u16(sel).ok_or(Error::InvalidAluMode(sel))?;
                mode.apply(self.inputs[InReg::Alu0], self.inputs[InReg::Alu1])
            }
        };

        if self.log_level.internals {
            println!("  reg {} -> {:04x}", reg, val);
        }

        Ok(val)
    }
}
