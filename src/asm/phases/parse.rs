use super::tokenize::Token;
use super::types::Located;
use crate::asm::model::{DebugContext, Inst, Item, Program, SourceLine, Value};
use crate::spec::types::hw::{OpCode, Word};
use std::fmt::Display;
use std::iter::Peekable;
use strum::IntoEnumIterator;

#[derive(Debug)]
pub enum Error {
    UnknownMnemonic(String),
    UnexpectedToken(Token, &'static str),
    UnexpectedEndOfStream(&'static str),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownMnemonic(name) => {
                write!(f, "Unknown instruction mnemonic: '{}'", name)
            }
            Error::UnexpectedToken(tk, msg) => {
                write!(f, "Unexpected token: '{}': expected {}", tk, msg)
            }
            Error::UnexpectedEndOfStream(msg) => {
                write!(f, "Unexpectedly encountered end of stream: expected {}", msg)
            }
        }
    }
}

struct Parser<I: Iterator<Item = Located<Token>>> {
    tokens: Peekable<I>,
}

impl<I: Iterator<Item = Located<Token>>> Parser<I> {
    fn next_expect(&mut self, what: &'static str) -> Result<Located<Token>, Located<Error>> {
        self.tokens
            .next()
            .ok_or_else(|| Located::from(Error::UnexpectedEndOfStream(what)))
    }

    fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek().map(|tk| &tk.value)
    }

    fn expect(&mut self, token: Token, what: &'static str) -> Result<(), Located<Error>> {
        let tk = self.next_expect(what)?;
        if tk.value == token {
            return Ok(());
        }
        Err(tk.map(|tk| Error::UnexpectedToken(tk, what)))
    }

    fn expect_str(&mut self, what: &'static str) -> Result<String, Located<Error>> {
        Ok(self
            .next_expect(what)?
            .try_map(|tk| match tk {
                Token::Str(s) => Ok(s),
                tk => Err(Error::UnexpectedToken(tk, what)),
            })?
            .value())
    }

    fn expect_num(&mut self, what: &'static str) -> Result<Word, Located<Error>> {
        Ok(self
            .next_expect(what)?
            .try_map(|tk| match tk {
                Token::Num(val) => Ok(val),
                tk => Err(Error::UnexpectedToken(tk, what)),
            })?
            .value())
    }

    fn parse_value(&mut self, what: &'static str) -> Result<Value, Located<Error>> {
        Ok(self
            .next_expect(what)?
            .try_map(|tk| match tk {
                Token::Num(val) => Ok(Value::Literal(val)),
                Token::Ref(name) => Ok(Value::Reference(name)),
                tk => Err(Error::UnexpectedToken(tk, what)),
            })?
            .value())
    }

    fn parse_inst(&mut self, name: String) -> Result<Inst, Located<Error>> {
        let op = OpCode::iter()
            .find(|op| op.to_string() == name)
            .ok_or_else(|| Located::from(Error::UnknownMnemonic(name)))?;

        Ok(match op {
            OpCode::StpCpu => Inst::StpCpu,
            OpCode::RamReg => Inst::RamReg {
                mem: self.parse_value("a memory address operand")?,
                reg: self.parse_value("a register operand")?,
            },
            OpCode::RegRam => Inst::RegRam {
                reg: self.parse_value("a register operand")?,
                mem: self.parse_value("a memory address operand")?,
            },
            OpCode::SetReg => Inst::SetReg {
                reg: self.parse_value("a register operand")?,
                val: self.parse_value("a value operand")?,
            },
            OpCode::SetRam => Inst::SetRam {
                mem: self.parse_value("a memory address operand")?,
                val: self.parse_value("a value operand")?,
            },
            OpCode::RegReg => Inst::RegReg {
                from: self.parse_value("a source register operand")?,
                to: self.parse_value("a destination register operand")?,
            },
            OpCode::GotoOp => Inst::GotoOp {
                target: self.parse_value("a jump target")?,
            },
            OpCode::CnGoto => Inst::CnGoto {
                target: self.parse_value("a jump target")?,
            },
            OpCode::PrGoto => Inst::PrGoto,
            OpCode::PrRmRg => Inst::PrRmRg {
                reg: self.parse_value("a register operand")?,
            },
            OpCode::RgPrRm => Inst::RgPrRm {
                reg: self.parse_value("a register operand")?,
            },
            OpCode::StPrRm => Inst::StPrRm,
        })
    }

    /// A context block holds a description, then optionally a source
    /// position, a braced variable table, and a frame size, in that order.
    fn parse_context(&mut self) -> Result<DebugContext, Located<Error>> {
        let mut ctx = DebugContext::bare(self.expect_str("a context description")?);

        if let Some(Token::Str(_)) = self.peek() {
            let file = self.expect_str("a source file name")?;
            self.expect(Token::Colon, "':' after the source file name")?;
            let line = self.expect_num("a source line number")?;
            ctx.source = Some(SourceLine::new(file, line));
        }

        if let Some(Token::BraceOpen) = self.peek() {
            self.tokens.next();
            loop {
                if let Some(Token::BraceClose) = self.peek() {
                    self.tokens.next();
                    break;
                }
                let name = self.expect_str("a variable name")?;
                self.expect(Token::Colon, "':' after the variable name")?;
                let offset = self.expect_num("a variable frame offset")?;
                ctx.variables.push((name, offset));
            }
        }

        if let Some(Token::Num(_)) = self.peek() {
            ctx.frame_size = Some(self.expect_num("a frame size")?);
        }

        self.expect(Token::ContextClose, "']' closing the context block")?;
        Ok(ctx)
    }

    fn parse_item(&mut self) -> Result<Option<Item>, Located<Error>> {
        let tk = match self.tokens.next() {
            None => return Ok(None),
            Some(tk) => tk,
        };

        let loc = tk.loc;
        let item = match tk.value {
            Token::LabelDef(label) => Item::Label(label),
            Token::BraceOpen => Item::StartSection,
            Token::BraceClose => Item::EndSection,
            Token::ContextOpen => Item::Context(self.parse_context()?),
            Token::Name(name) => Item::Inst(
                self.parse_inst(name)
                    .map_err(|err| err.proximate_to(loc))?,
            ),
            tk => {
                return Err(Located {
                    loc,
                    value: Error::UnexpectedToken(
                        tk,
                        "a label definition, instruction, context, or section marker",
                    ),
                })
            }
        };

        Ok(Some(item))
    }
}

pub fn parse(tokens: Vec<Located<Token>>) -> Result<Program, Located<Error>> {
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
    };

    let mut items = Vec::new();
    while let Some(item) = parser.parse_item()? {
        items.push(item);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::super::tokenize;
    use super::*;

    fn parse_str(source: &str) -> Result<Program, String> {
        let tokens = tokenize::tokenize(source).map_err(|err| err.to_string())?;
        parse(tokens).map_err(|err| err.to_string())
    }

    #[test]
    fn insts_and_labels() {
        let prog = parse_str("start: SetReg 0 5\nGotoOp #start\nStpCpu").unwrap();
        assert_eq!(
            prog,
            vec![
                Item::Label("start".to_owned()),
                Item::Inst(Inst::SetReg {
                    reg: Value::Literal(0),
                    val: Value::Literal(5),
                }),
                Item::Inst(Inst::GotoOp {
                    target: Value::Reference("start".to_owned()),
                }),
                Item::Inst(Inst::StpCpu),
            ]
        );
    }

    #[test]
    fn sections_nest() {
        let prog = parse_str("{\n{\nStpCpu\n}\n}").unwrap();
        assert_eq!(
            prog,
            vec![
                Item::StartSection,
                Item::StartSection,
                Item::Inst(Inst::StpCpu),
                Item::EndSection,
                Item::EndSection,
            ]
        );
    }

    #[test]
    fn context_full() {
        let prog = parse_str("[ \"byte x;\" \"main.sym\":3 { \"x\":2 \"y\":3 } 4 ]").unwrap();
        assert_eq!(
            prog,
            vec![Item::Context(DebugContext {
                description: "byte x;".to_owned(),
                source: Some(SourceLine::new("main.sym".to_owned(), 3)),
                variables: vec![("x".to_owned(), 2), ("y".to_owned(), 3)],
                frame_size: Some(4),
            })]
        );
    }

    #[test]
    fn context_bare() {
        let prog = parse_str("[ \"Executable Header\" ]").unwrap();
        assert_eq!(
            prog,
            vec![Item::Context(DebugContext::bare("Executable Header"))]
        );
    }

    #[test]
    fn context_frame_size_without_variables() {
        let prog = parse_str("[ \"return;\" \"main.sym\":9 2 ]").unwrap();
        assert_eq!(
            prog,
            vec![Item::Context(DebugContext {
                description: "return;".to_owned(),
                source: Some(SourceLine::new("main.sym".to_owned(), 9)),
                variables: vec![],
                frame_size: Some(2),
            })]
        );
    }

    #[test]
    fn operand_order_is_source_order() {
        let prog = parse_str("RegRam 3 100\nSetRam 7 1").unwrap();
        assert_eq!(
            prog,
            vec![
                Item::Inst(Inst::RegRam {
                    reg: Value::Literal(3),
                    mem: Value::Literal(100),
                }),
                Item::Inst(Inst::SetRam {
                    mem: Value::Literal(7),
                    val: Value::Literal(1),
                }),
            ]
        );
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        assert!(parse_str("FooBar 1 2").is_err());
    }

    #[test]
    fn rejects_missing_operand() {
        assert!(parse_str("SetReg 0").is_err());
    }

    #[test]
    fn rejects_stray_value() {
        assert!(parse_str("5").is_err());
    }
}
