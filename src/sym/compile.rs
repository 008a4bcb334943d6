//! Lowering from structured source to labeled instructions.
//!
//! Every function owns a stack frame addressed through input slot 3.
//! Relative to the frame base, cell 0 holds the caller's frame pointer,
//! cell 1 the instruction index to resume the caller at, cell 2 (only
//! in value-returning functions) a pointer to the caller's destination
//! cell, and the remaining cells hold parameters and locals in
//! declaration order.

use super::model::{
    Call, FunctionDef, Operand, Prototype, Statement, StatementCode, TopLevel, Type, Unit,
};
use crate::asm::model::{DebugContext, Inst, Item, Program, SourceLine, Value};
use crate::spec::types::hw::Word;
use std::fmt::Display;

/// Names lowered to direct register traffic instead of calls. Neither
/// may be declared as a function or a variable.
pub const RESERVED_FUNCTIONS: [&str; 2] = ["getReg", "setReg"];

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    ReservedFunction(String),
    InvalidMain,
    ConflictingSignature,
    UnknownFunction(String),
    NotValueReturning { name: String, function: String },
    ReservedVariable { name: String, function: String },
    DuplicateVariable { name: String, function: String },
    UnknownVariable { name: String, function: String },
    BuiltinArity { builtin: &'static str, function: String },
    BuiltinNonLiteral { builtin: &'static str, function: String },
    ValueReturnFromVoid { function: String },
    VoidReturnFromValue { function: String, returns: Type },
    BreakOutsideWhile { function: String },
    UnresolvedImport(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ReservedFunction(name) => write!(
                f,
                "Found a function definition or declaration with the reserved name \"{}\"",
                name
            ),
            Error::InvalidMain => write!(
                f,
                "the function \"main\" must return void and take no parameters"
            ),
            Error::ConflictingSignature => write!(
                f,
                "Attempted to declare a function that conflicts with another"
            ),
            Error::UnknownFunction(name) => {
                write!(f, "Could not find a function with the name \"{}\"", name)
            }
            Error::NotValueReturning { name, function } => write!(
                f,
                "Attempted to call function \"{}\" in function \"{}\" but a function with that signature does not exist",
                name, function
            ),
            Error::ReservedVariable { name, function } => write!(
                f,
                "Attempted to declare variable \"{}\" in function \"{}\" but that name is reserved",
                name, function
            ),
            Error::DuplicateVariable { name, function } => write!(
                f,
                "Attempted to declare variable \"{}\" in function \"{}\" twice",
                name, function
            ),
            Error::UnknownVariable { name, function } => write!(
                f,
                "Attempted to get stack variable address of \"{}\" in function \"{}\" but that variable doesn't exist",
                name, function
            ),
            Error::BuiltinArity { builtin, function } => write!(
                f,
                "attempted to call built-in function '{}' with invalid number of parameters in function \"{}\"",
                builtin, function
            ),
            Error::BuiltinNonLiteral { builtin, function } => write!(
                f,
                "attempted to call built-in function '{}' with an invalid parameter in function \"{}\", first parameter must be a number-literal",
                builtin, function
            ),
            Error::ValueReturnFromVoid { function } => write!(
                f,
                "Attempted to return a value in function \"{}\", which has a return type of \"void\"",
                function
            ),
            Error::VoidReturnFromValue { function, returns } => write!(
                f,
                "Attempted to return void in function \"{}\", which has a return type of \"{}\"",
                function, returns
            ),
            Error::BreakOutsideWhile { function } => write!(
                f,
                "Attempted to break in function \"{}\" without being inside of a while statement",
                function
            ),
            Error::UnresolvedImport(file) => write!(
                f,
                "Found an unresolved import of \"{}\", imports must be resolved before compilation",
                file
            ),
        }
    }
}

fn lit(val: Word) -> Value {
    Value::Literal(val)
}

fn set_reg(reg: Word, val: Word) -> Inst {
    Inst::SetReg {
        reg: lit(reg),
        val: lit(val),
    }
}

fn set_reg_ref(reg: Word, target: String) -> Inst {
    Inst::SetReg {
        reg: lit(reg),
        val: Value::Reference(target),
    }
}

fn reg_reg(from: Word, to: Word) -> Inst {
    Inst::RegReg {
        from: lit(from),
        to: lit(to),
    }
}

fn pr_rm_rg(reg: Word) -> Inst {
    Inst::PrRmRg { reg: lit(reg) }
}

fn goto(target: String) -> Inst {
    Inst::GotoOp {
        target: Value::Reference(target),
    }
}

fn entry_label(proto: &Prototype) -> String {
    format!(
        "__function__{}__{}{}",
        proto.returns,
        proto.name,
        "__byte".repeat(proto.arity())
    )
}

fn check_signature(proto: &Prototype) -> Result<(), Error> {
    if RESERVED_FUNCTIONS.contains(&proto.name.as_str()) {
        return Err(Error::ReservedFunction(proto.name.clone()));
    }

    if proto.name == "main" && (proto.returns != Type::Void || proto.arity() != 0) {
        return Err(Error::InvalidMain);
    }

    Ok(())
}

/// The per-function lowering state. Forked (cloned) when descending
/// into a nested statement list, so declarations inside a block stay
/// inside it; the function table and label counter live on [`Compiler`]
/// and are shared across forks.
#[derive(Debug, Clone)]
struct Frame {
    proto: Prototype,
    variables: Vec<String>,
    break_target: Option<String>,
}

impl Frame {
    fn new(proto: Prototype) -> Frame {
        Frame {
            proto,
            variables: Vec::new(),
            break_target: None,
        }
    }

    /// Frame cell of the first variable: past the two saved pointers,
    /// and past the return value pointer when there is one.
    fn first_slot(&self) -> Word {
        match self.proto.returns {
            Type::Void => 2,
            Type::Byte => 3,
        }
    }

    fn size(&self) -> Word {
        self.first_slot() + self.variables.len() as Word
    }

    fn declare(&mut self, name: &str) -> Result<(), Error> {
        if self.variables.iter().any(|v| v == name) {
            return Err(Error::DuplicateVariable {
                name: name.to_owned(),
                function: self.proto.name.clone(),
            });
        }

        if RESERVED_FUNCTIONS.contains(&name) {
            return Err(Error::ReservedVariable {
                name: name.to_owned(),
                function: self.proto.name.clone(),
            });
        }

        self.variables.push(name.to_owned());
        Ok(())
    }

    fn variable_address(&self, name: &str) -> Result<Word, Error> {
        self.variables
            .iter()
            .position(|v| v == name)
            .map(|pos| self.first_slot() + pos as Word)
            .ok_or_else(|| Error::UnknownVariable {
                name: name.to_owned(),
                function: self.proto.name.clone(),
            })
    }

    fn layout(&self) -> Vec<(String, Word)> {
        let first = self.first_slot();
        self.variables
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.clone(), first + pos as Word))
            .collect()
    }
}

struct Compiler<'a> {
    file: &'a str,
    functions: Vec<Prototype>,
    next_token: u64,
    out: Program,
}

impl Compiler<'_> {
    fn fresh_token(&mut self) -> String {
        let token = self.next_token;
        self.next_token += 1;
        token.to_string()
    }

    fn emit(&mut self, inst: Inst) {
        self.out.push(Item::Inst(inst));
    }

    fn label(&mut self, name: String) {
        self.out.push(Item::Label(name));
    }

    fn lookup(&self, name: &str, arity: usize) -> Option<&Prototype> {
        self.functions
            .iter()
            .find(|proto| proto.name == name && proto.arity() == arity)
    }

    fn register(&mut self, proto: &Prototype) -> Result<(), Error> {
        check_signature(proto)?;

        match self.lookup(&proto.name, proto.arity()) {
            Some(existing) => {
                if existing.returns != proto.returns {
                    return Err(Error::ConflictingSignature);
                }
            }
            None => self.functions.push(proto.clone()),
        }

        Ok(())
    }

    fn function(&mut self, def: &FunctionDef) -> Result<(), Error> {
        let mut frame = Frame::new(def.proto.clone());
        for param in &def.proto.params {
            frame.declare(param)?;
        }

        self.label(entry_label(&def.proto));
        self.out.push(Item::StartSection);
        self.out.push(Item::Context(DebugContext {
            description: format!("{}{{", def.proto),
            source: None,
            variables: frame.layout(),
            frame_size: Some(frame.size()),
        }));
        // Prime slot 1 so derived register 1 addresses this frame.
        self.emit(reg_reg(0, 1));

        self.statements(frame, &def.body)?;

        // Value-returning functions must return explicitly; falling off
        // the end runs into whatever instructions follow.
        if def.proto.returns == Type::Void {
            self.leave();
        }
        self.out.push(Item::EndSection);

        Ok(())
    }

    fn statements(&mut self, mut frame: Frame, stmts: &[Statement]) -> Result<(), Error> {
        self.out.push(Item::StartSection);

        for stmt in stmts {
            // The context reflects the frame before the statement runs,
            // so a declaration's own variable is not yet visible in it.
            self.out.push(Item::Context(DebugContext {
                description: stmt.to_string(),
                source: Some(SourceLine::new(self.file.to_owned(), stmt.line)),
                variables: frame.layout(),
                frame_size: Some(frame.size()),
            }));

            match &stmt.code {
                StatementCode::Declare(name) => frame.declare(name)?,
                StatementCode::Assign { var, value } => self.assign(&frame, var, value)?,
                StatementCode::Call(call) => self.call_statement(&frame, call)?,
                StatementCode::AssignCall { var, call } => self.assign_call(&frame, var, call)?,
                StatementCode::ReturnValue(value) => self.return_value(&frame, value)?,
                StatementCode::ReturnVoid => self.return_void(&frame)?,
                StatementCode::Break => self.break_out(&frame)?,
                StatementCode::If { cond, body } => self.if_statement(&frame, cond, body)?,
                StatementCode::While { cond, body } => self.while_statement(&frame, cond, body)?,
            }
        }

        self.out.push(Item::EndSection);
        Ok(())
    }

    /// Restore the caller's frame pointer and jump to the saved
    /// instruction index.
    fn leave(&mut self) {
        self.emit(set_reg(0, 0));
        self.emit(pr_rm_rg(3));
        self.emit(set_reg(0, 1));
        self.emit(pr_rm_rg(0));
        self.emit(Inst::PrGoto);
    }

    fn assign(&mut self, frame: &Frame, var: &str, value: &Operand) -> Result<(), Error> {
        let addr = frame.variable_address(var)?;

        match value {
            Operand::Var(src) => {
                let src_addr = frame.variable_address(src)?;
                self.emit(set_reg(0, src_addr));
                self.emit(pr_rm_rg(2));
                self.emit(set_reg(0, addr));
                self.emit(Inst::StPrRm);
            }
            Operand::Lit(val) => {
                self.emit(set_reg(0, addr));
                self.emit(set_reg(2, *val));
                self.emit(Inst::StPrRm);
            }
        }

        Ok(())
    }

    fn builtin_target(frame: &Frame, builtin: &'static str, call: &Call) -> Result<Word, Error> {
        match call.args.first() {
            Some(Operand::Lit(reg)) => Ok(*reg),
            _ => Err(Error::BuiltinNonLiteral {
                builtin,
                function: frame.proto.name.clone(),
            }),
        }
    }

    fn call_statement(&mut self, frame: &Frame, call: &Call) -> Result<(), Error> {
        if call.name == "setReg" {
            if call.args.len() != 2 {
                return Err(Error::BuiltinArity {
                    builtin: "setReg",
                    function: frame.proto.name.clone(),
                });
            }
            let reg = Self::builtin_target(frame, "setReg", call)?;

            match &call.args[1] {
                Operand::Var(name) => {
                    let addr = frame.variable_address(name)?;
                    self.emit(set_reg(0, addr));
                    self.emit(pr_rm_rg(reg));
                }
                Operand::Lit(val) => self.emit(set_reg(reg, *val)),
            }

            return Ok(());
        }

        self.call(frame, call, false)
    }

    fn assign_call(&mut self, frame: &Frame, var: &str, call: &Call) -> Result<(), Error> {
        let addr = frame.variable_address(var)?;

        if call.name == "getReg" {
            if call.args.len() != 1 {
                return Err(Error::BuiltinArity {
                    builtin: "getReg",
                    function: frame.proto.name.clone(),
                });
            }
            let reg = Self::builtin_target(frame, "getReg", call)?;

            self.emit(set_reg(0, addr));
            self.emit(reg_reg(reg, 2));
            self.emit(Inst::StPrRm);

            return Ok(());
        }

        let returns_value = self
            .lookup(&call.name, call.args.len())
            .map(|callee| callee.returns == Type::Byte)
            .unwrap_or(false);
        if !returns_value {
            return Err(Error::NotValueReturning {
                name: call.name.clone(),
                function: frame.proto.name.clone(),
            });
        }

        // Point the callee's return value pointer at the destination
        // variable before the call header overwrites the scratch slots.
        self.emit(set_reg(0, addr));
        self.emit(reg_reg(1, 2));
        self.emit(set_reg(0, frame.size() + 2));
        self.emit(Inst::StPrRm);

        self.call(frame, call, true)
    }

    fn call(&mut self, frame: &Frame, call: &Call, return_handled: bool) -> Result<(), Error> {
        let return_label = format!("__functionReturn__{}", self.fresh_token());

        let callee = self
            .lookup(&call.name, call.args.len())
            .ok_or_else(|| Error::UnknownFunction(call.name.clone()))?
            .clone();

        let frame_size = frame.size();
        let args_start = match callee.returns {
            Type::Void => frame_size + 2,
            Type::Byte => frame_size + 3,
        };

        if callee.returns == Type::Byte && !return_handled {
            // Nobody wants the return value: aim the callee's return
            // value pointer at its own cell and let the value land there.
            self.emit(set_reg(0, frame_size + 2));
            self.emit(reg_reg(1, 2));
            self.emit(Inst::StPrRm);
        }

        // New frame header: saved frame pointer, then resume index.
        self.emit(reg_reg(0, 2));
        self.emit(set_reg(0, frame_size));
        self.emit(Inst::StPrRm);
        self.emit(set_reg(0, frame_size + 1));
        self.emit(set_reg_ref(2, return_label.clone()));
        self.emit(Inst::StPrRm);

        for (pos, arg) in call.args.iter().enumerate() {
            match arg {
                Operand::Var(name) => {
                    let addr = frame.variable_address(name)?;
                    self.emit(set_reg(0, addr));
                    self.emit(pr_rm_rg(2));
                }
                Operand::Lit(val) => self.emit(set_reg(2, *val)),
            }
            self.emit(set_reg(0, args_start + pos as Word));
            self.emit(Inst::StPrRm);
        }

        self.emit(set_reg(0, frame_size));
        self.emit(reg_reg(1, 3));

        self.emit(goto(entry_label(&callee)));
        self.label(return_label);
        self.emit(reg_reg(0, 1));

        Ok(())
    }

    fn return_value(&mut self, frame: &Frame, value: &Operand) -> Result<(), Error> {
        if frame.proto.returns == Type::Void {
            return Err(Error::ValueReturnFromVoid {
                function: frame.proto.name.clone(),
            });
        }

        match value {
            Operand::Var(name) => {
                let addr = frame.variable_address(name)?;
                self.emit(set_reg(0, addr));
                self.emit(pr_rm_rg(2));
            }
            Operand::Lit(val) => self.emit(set_reg(2, *val)),
        }

        // Store the value through the return value pointer, then unwind.
        self.emit(set_reg(0, 2));
        self.emit(pr_rm_rg(0));
        self.emit(set_reg(1, 0));
        self.emit(Inst::StPrRm);
        self.emit(reg_reg(0, 1));
        self.leave();

        Ok(())
    }

    fn return_void(&mut self, frame: &Frame) -> Result<(), Error> {
        if frame.proto.returns != Type::Void {
            return Err(Error::VoidReturnFromValue {
                function: frame.proto.name.clone(),
                returns: frame.proto.returns,
            });
        }

        self.leave();
        Ok(())
    }

    fn break_out(&mut self, frame: &Frame) -> Result<(), Error> {
        match &frame.break_target {
            Some(target) => {
                self.emit(goto(target.clone()));
                Ok(())
            }
            None => Err(Error::BreakOutsideWhile {
                function: frame.proto.name.clone(),
            }),
        }
    }

    fn if_statement(
        &mut self,
        frame: &Frame,
        cond: &Operand,
        body: &[Statement],
    ) -> Result<(), Error> {
        match cond {
            Operand::Var(name) => {
                let token = self.fresh_token();
                let true_label = format!("__ifTrue__{}", token);
                let false_label = format!("__ifFalse__{}", token);

                let addr = frame.variable_address(name)?;
                self.emit(set_reg(0, addr));
                self.emit(pr_rm_rg(0));
                self.emit(Inst::CnGoto {
                    target: Value::Reference(true_label.clone()),
                });
                self.emit(goto(false_label.clone()));
                self.label(true_label);
                self.statements(frame.clone(), body)?;
                self.label(false_label);
            }
            // Literal conditions settle at compile time: drop the body
            // outright, or run it unconditionally.
            Operand::Lit(0) => {}
            Operand::Lit(_) => self.statements(frame.clone(), body)?,
        }

        Ok(())
    }

    fn while_statement(
        &mut self,
        frame: &Frame,
        cond: &Operand,
        body: &[Statement],
    ) -> Result<(), Error> {
        match cond {
            Operand::Var(name) => {
                let token = self.fresh_token();
                let loop_label = format!("__whileLoop__{}", token);
                let true_label = format!("__whileTrue__{}", token);
                let false_label = format!("__whileFalse__{}", token);

                let addr = frame.variable_address(name)?;
                self.label(loop_label.clone());
                self.emit(set_reg(0, addr));
                self.emit(pr_rm_rg(0));
                self.emit(Inst::CnGoto {
                    target: Value::Reference(true_label.clone()),
                });
                self.emit(goto(false_label.clone()));
                self.label(true_label);

                let mut body_frame = frame.clone();
                body_frame.break_target = Some(false_label.clone());
                self.statements(body_frame, body)?;

                self.emit(goto(loop_label));
                self.label(false_label);
            }
            Operand::Lit(0) => {}
            Operand::Lit(_) => {
                let token = self.fresh_token();
                let loop_label = format!("__whileLoop__{}", token);
                let false_label = format!("__whileFalse__{}", token);

                self.label(loop_label.clone());

                let mut body_frame = frame.clone();
                body_frame.break_target = Some(false_label.clone());
                self.statements(body_frame, body)?;

                self.emit(goto(loop_label));
                self.label(false_label);
            }
        }

        Ok(())
    }
}

/// Lower a unit to a labeled instruction program. Imports must already
/// have been resolved away; `file` names the unit's source file for the
/// debug contexts.
pub fn lower(unit: &Unit, file: &str) -> Result<Program, Error> {
    let mut compiler = Compiler {
        file,
        functions: Vec::new(),
        next_token: 0,
        out: Vec::new(),
    };

    for top in unit {
        match top {
            TopLevel::Import(path) => return Err(Error::UnresolvedImport(path.clone())),
            TopLevel::Declare(proto) => compiler.register(proto)?,
            TopLevel::Define(def) => {
                compiler.register(&def.proto)?;
                compiler.function(def)?;
            }
        }
    }

    Ok(compiler.out)
}

/// The program prefix that boots into `main`: zeroed frame pointer, a
/// synthetic frame whose resume index points past the jump, and a halt
/// for when `main` comes back.
pub fn executable_header() -> Program {
    let main = Prototype::new(Type::Void, "main".to_owned(), Vec::new());

    vec![
        Item::Context(DebugContext::bare("Executable Header")),
        Item::Inst(set_reg(3, 0)),
        Item::Inst(Inst::SetRam {
            mem: lit(0),
            val: lit(0),
        }),
        Item::Inst(Inst::SetRam {
            mem: lit(1),
            val: Value::Reference("__mainReturn".to_owned()),
        }),
        Item::Inst(goto(entry_label(&main))),
        Item::Label("__mainReturn".to_owned()),
        Item::Inst(Inst::StpCpu),
    ]
}
