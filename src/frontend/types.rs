use crate::asm::phases::resolve;
use crate::sym::compile;
use crate::{asm, sym, vm};
use std::fmt::Display;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Read { path: PathBuf, cause: io::Error },
    Write { path: PathBuf, cause: io::Error },
    Sym(sym::Error),
    Asm(asm::Error),
    Vm(vm::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Read { path, cause } => {
                write!(f, "Could not read \"{}\": {}", path.display(), cause)
            }
            Error::Write { path, cause } => {
                write!(f, "Could not write \"{}\": {}", path.display(), cause)
            }
            Error::Sym(err) => write!(f, "{}", err),
            Error::Asm(err) => write!(f, "{}", err),
            Error::Vm(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<sym::Error> for Error {
    fn from(err: sym::Error) -> Self {
        Error::Sym(err)
    }
}

impl From<compile::Error> for Error {
    fn from(err: compile::Error) -> Self {
        Error::Sym(sym::Error::Compile(err))
    }
}

impl From<asm::Error> for Error {
    fn from(err: asm::Error) -> Self {
        Error::Asm(err)
    }
}

impl From<resolve::Error> for Error {
    fn from(err: resolve::Error) -> Self {
        Error::Asm(asm::Error::Resolve(err))
    }
}

impl From<vm::Error> for Error {
    fn from(err: vm::Error) -> Self {
        Error::Vm(err)
    }
}
