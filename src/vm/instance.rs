use num_traits::FromPrimitive;
use std::io::{self, BufRead, Write};
use strum::IntoEnumIterator;

use super::debug;
use super::mem::Mem;
use super::reg::Reg;
use super::types::{Error, LogLevel, Monitor};
use crate::asm::{self, model::Program, phases};
use crate::spec::types::hw::{AluMode, InReg, OpCode, OutReg, Word, INST_WORDS};

enum Flow {
    Advance,
    Jump,
    Halt,
}

/// A loaded machine: bytecode image, the register files, growable
/// memory, and the output monitor. Loading from an assembly program
/// (rather than a raw image) retains the program as debug data, which
/// the interactive debugger needs for stack reconstruction.
pub struct Instance<'a> {
    log_level: &'a LogLevel,
    rom: Vec<Word>,
    debug_data: Option<Program>,
    debugging: bool,
    pointer: Word,
    total_steps: u64,
    reg: Reg<'a>,
    mem: Mem<'a>,
    monitor: Monitor,
}

impl<'a> Instance<'a> {
    pub fn new(log_level: &LogLevel) -> Instance {
        Instance {
            log_level,
            rom: Vec::new(),
            debug_data: None,
            debugging: false,
            pointer: 0,
            total_steps: 0,
            reg: Reg::new(log_level),
            mem: Mem::new(log_level),
            monitor: Monitor::default(),
        }
    }

    pub fn load_program(&mut self, program: Program) -> Result<(), asm::Error> {
        self.rom = phases::resolve(&program)?;
        self.debug_data = Some(program);

        Ok(())
    }

    pub fn load_image(&mut self, image: Vec<Word>) {
        self.rom = image;
        self.debug_data = None;
        self.debugging = false;
    }

    pub fn enable_debugger(&mut self) -> Result<(), Error> {
        if self.debug_data.is_none() {
            return Err(Error::NoDebugData);
        }

        self.debugging = true;
        Ok(())
    }

    pub fn expect_output(&mut self, values: Vec<Word>) {
        self.monitor.expect(values);
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Execute from instruction zero on cleared registers and memory
    /// until a `StpCpu`, then settle the monitor's verdict.
    pub fn run(&mut self) -> Result<(), Error> {
        self.mem.clear();
        self.reg.clear();
        self.pointer = 0;
        self.total_steps = 0;

        loop {
            let quad = self.fetch()?;
            if self.log_level.internals {
                println!(
                    "step {}: {:04x} [{:04x} {:04x} {:04x} {:04x}]",
                    self.total_steps, self.pointer, quad[0], quad[1], quad[2], quad[3]
                );
            }

            self.total_steps += 1;
            let flow = self.execute(quad)?;
            if let Flow::Halt = flow {
                break;
            }

            if self.debugging {
                self.print_state()?;
                Instance::pause();
            }

            if let Flow::Advance = flow {
                self.pointer = self.pointer.wrapping_add(1);
            }
        }

        self.monitor.finish()
    }

    fn fetch(&self) -> Result<[Word; INST_WORDS], Error> {
        let base = self.pointer as usize * INST_WORDS;
        if base + INST_WORDS > self.rom.len() {
            return Err(Error::PointerPastEnd);
        }

        let mut quad = [0; INST_WORDS];
        quad.copy_from_slice(&self.rom[base..base + INST_WORDS]);
        Ok(quad)
    }

    fn execute(&mut self, quad: [Word; INST_WORDS]) -> Result<Flow, Error> {
        let op = OpCode::from_u16(quad[0]).ok_or(Error::InvalidOpcode(quad[0]))?;
        let (a, b) = (quad[1], quad[2]);

        let flow = match op {
            OpCode::StpCpu => Flow::Halt,
            OpCode::RamReg => {
                let val = self.mem.read(a);
                self.set_register(b, val)?;
                Flow::Advance
            }
            OpCode::RegRam => {
                let val = self.get_register(b)?;
                self.mem.write(a, val);
                Flow::Advance
            }
            OpCode::SetReg => {
                self.set_register(b, a)?;
                Flow::Advance
            }
            OpCode::SetRam => {
                self.mem.write(a, b);
                Flow::Advance
            }
            OpCode::RegReg => {
                let val = self.get_register(a)?;
                self.set_register(b, val)?;
                Flow::Advance
            }
            OpCode::GotoOp => {
                self.pointer = a;
                Flow::Jump
            }
            OpCode::CnGoto => {
                if self.reg.input(InReg::Op0) > 0 {
                    self.pointer = a;
                    Flow::Jump
                } else {
                    Flow::Advance
                }
            }
            OpCode::PrGoto => {
                self.pointer = self.reg.input(InReg::Op0);
                Flow::Jump
            }
            OpCode::PrRmRg => {
                let val = self.mem.read(self.reg.selected_address());
                self.set_register(a, val)?;
                Flow::Advance
            }
            OpCode::RgPrRm => {
                let val = self.get_register(a)?;
                self.mem.write(self.reg.selected_address(), val);
                Flow::Advance
            }
            OpCode::StPrRm => {
                let addr = self.reg.selected_address();
                let val = self.reg.input(InReg::Op2);
                self.mem.write(addr, val);
                Flow::Advance
            }
        };

        Ok(flow)
    }

    fn set_register(&mut self, addr: Word, val: Word) -> Result<(), Error> {
        let reg = InReg::from_u16(addr).ok_or(Error::SetInvalidRegister(addr))?;
        if let InReg::Monitor = reg {
            self.monitor.observe(val)?;
        }

        self.reg.write(reg, val);
        Ok(())
    }

    fn get_register(&self, addr: Word) -> Result<Word, Error> {
        let reg = OutReg::from_u16(addr).ok_or(Error::GetInvalidRegister(addr))?;
        self.reg.read(reg)
    }

    pub fn print_state(&mut self) -> Result<(), Error> {
        let state = self.render_state()?;
        print!("{}", state);
        Ok(())
    }

    fn pause() {
        print!("Press enter to continue...");
        let _ = io::stdout().flush();

        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }

    fn padded(name: &str, pad: char) -> String {
        let mut name = name.to_owned();
        while name.len() < 22 {
            name.push(pad);
        }
        name
    }

    /// The full debugger dump: memory, the instruction at the pointer,
    /// both register files, and (when debug data is loaded) the stack
    /// trace reconstructed by walking the frame chain through memory.
    fn render_state(&mut self) -> Result<String, Error> {
        let mut out = String::new();

        out.push_str("Ram Dump:\n");
        for (idx, cell) in self.mem.cells().iter().enumerate() {
            out.push_str(&format!("{:04x} ", cell));
            if idx % 8 == 7 {
                out.push('\n');
            }
        }
        out.push_str("\n\n");

        let quad = self.fetch()?;
        out.push_str(&format!(
            "Instruction Pointer: {:04x} [{:04x} {:04x} {:04x} {:04x}]\n\n",
            self.pointer, quad[0], quad[1], quad[2], quad[3]
        ));

        out.push_str("Input Registers:\n");
        for (idx, reg) in InReg::iter().enumerate() {
            let pad = if idx % 2 == 0 { ' ' } else { '_' };
            let val = self.reg.input(reg);
            out.push_str(&format!(
                "    {}: {:04x}",
                Instance::padded(reg.describe(), pad),
                val
            ));
            match reg {
                InReg::AluSel => {
                    let mode = AluMode::from_u16(val)
                        .map(AluMode::describe)
                        .unwrap_or("Invalid Mode");
                    out.push_str(&format!(" - {}", mode));
                }
                InReg::Monitor => out.push_str(&format!(" - {}", val)),
                _ => (),
            }
            out.push('\n');
        }

        out.push_str("Output Registers:\n");
        for reg in OutReg::iter() {
            out.push_str(&format!(
                "    {}: {:04x}\n",
                Instance::padded(reg.describe(), ' '),
                self.reg.read(reg)?
            ));
        }

        if let Some(program) = &self.debug_data {
            out.push_str("\nStack Trace:\n");

            let context = debug::context_at(program, self.pointer)?;
            if context.frame_size.is_none() {
                // Not inside a function, so there is no frame chain to
                // walk; report the lone context instead.
                out.push_str(&format!("[\"{}\"]\n", context.description));
                return Ok(out);
            }

            let mut frame_base = self.reg.input(InReg::Frame);
            let mut frame_inst = self.pointer;
            loop {
                let function = debug::function_context_at(program, frame_inst)?;
                out.push_str(&format!("[\"{}\"]\n", function.description));

                let frame = debug::context_at(program, frame_inst)?;
                out.push_str(&format!("    [\"{}\"", frame.description));
                if let Some(source) = &frame.source {
                    out.push_str(&format!(" \"{}\":{}", source.file, source.line));
                }
                out.push_str("]\n");

                for (name, offset) in frame.variables.iter().rev() {
                    let addr = frame_base.wrapping_add(*offset);
                    let val = self.mem.read(addr);
                    out.push_str(&format!(
                        "    {:04x}: {:04x} = {} = {}\n",
                        addr, val, name, val
                    ));
                }

                if let Some(frame_size) = frame.frame_size {
                    if frame_size as usize == frame.variables.len() + 3 {
                        let addr = frame_base.wrapping_add(2);
                        let val = self.mem.read(addr);
                        out.push_str(&format!(
                            "    {:04x}: {:04x} = Return Value Pointer\n",
                            addr, val
                        ));
                    }
                }

                let lip_addr = frame_base.wrapping_add(1);
                let lip = self.mem.read(lip_addr);
                out.push_str(&format!(
                    "    {:04x}: {:04x} = Last Instruction\n",
                    lip_addr, lip
                ));

                let lsp = self.mem.read(frame_base);
                out.push_str(&format!(
                    "    {:04x}: {:04x} = Last Stack Pointer\n",
                    frame_base, lsp
                ));

                frame_inst = lip;
                frame_base = lsp;

                if debug::context_at(program, frame_inst)?.frame_size.is_none() {
                    break;
                }
            }
        }

        Ok(out)
    }
}
