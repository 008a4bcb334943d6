use super::{parse, tokenize};
use crate::sym::compile;
use std::fmt::Display;

pub use crate::lex::{Loc, Located};

#[derive(Debug)]
pub enum Error {
    Tokenize(Located<tokenize::Error>),
    Parse(Located<parse::Error>),
    Compile(compile::Error),
}

impl From<Located<tokenize::Error>> for Error {
    fn from(err: Located<tokenize::Error>) -> Error {
        Error::Tokenize(err)
    }
}

impl From<Located<parse::Error>> for Error {
    fn from(err: Located<parse::Error>) -> Error {
        Error::Parse(err)
    }
}

impl From<compile::Error> for Error {
    fn from(err: compile::Error) -> Error {
        Error::Compile(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Tokenize(err) => write!(f, "Tokenize error {}", err),
            Error::Parse(err) => write!(f, "Parse error {}", err),
            Error::Compile(err) => write!(f, "{}", err),
        }
    }
}
