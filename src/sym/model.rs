use crate::spec::types::hw::Word;
use derive_more::Constructor;
use itertools::Itertools;
use std::fmt::Display;

/// The two declarable types: a machine word, or nothing. Functions may
/// return either; variables and parameters are always `Byte`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Byte,
    Void,
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Byte => write!(f, "byte"),
            Type::Void => write!(f, "void"),
        }
    }
}

/// A value position: a stack variable by name, or a literal word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Var(String),
    Lit(Word),
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Var(name) => write!(f, "{}", name),
            Operand::Lit(lit) => write!(f, "{}", lit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Call {
    pub name: String,
    pub args: Vec<Operand>,
}

impl Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.args.iter().format(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementCode {
    Declare(String),
    Assign { var: String, value: Operand },
    Call(Call),
    AssignCall { var: String, call: Call },
    ReturnValue(Operand),
    ReturnVoid,
    Break,
    If { cond: Operand, body: Vec<Statement> },
    While { cond: Operand, body: Vec<Statement> },
}

/// The canonical one-line rendering, used as the description attached
/// to each statement's debug context. Block statements render just
/// their opening line.
impl Display for StatementCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementCode::Declare(name) => write!(f, "byte {};", name),
            StatementCode::Assign { var, value } => write!(f, "{} = {};", var, value),
            StatementCode::Call(call) => write!(f, "{};", call),
            StatementCode::AssignCall { var, call } => write!(f, "{} = {};", var, call),
            StatementCode::ReturnValue(value) => write!(f, "return {};", value),
            StatementCode::ReturnVoid => write!(f, "return;"),
            StatementCode::Break => write!(f, "break;"),
            StatementCode::If { cond, .. } => write!(f, "if({}){{", cond),
            StatementCode::While { cond, .. } => write!(f, "while({}){{", cond),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Statement {
    pub code: StatementCode,
    pub line: Word,
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.code.fmt(f)
    }
}

/// A function signature. Parameters are always `byte`, so only their
/// names are kept.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Prototype {
    pub returns: Type,
    pub name: String,
    pub params: Vec<String>,
}

impl Prototype {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Display for Prototype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}({})",
            self.returns,
            self.name,
            self.params
                .iter()
                .format_with(", ", |name, f| f(&format_args!("byte {}", name)))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct FunctionDef {
    pub proto: Prototype,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopLevel {
    Import(String),
    Declare(Prototype),
    Define(FunctionDef),
}

pub type Unit = Vec<TopLevel>;
