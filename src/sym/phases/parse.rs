use super::tokenize::Token;
use super::types::Located;
use crate::spec::types::hw::Word;
use crate::sym::model::{
    Call, FunctionDef, Operand, Prototype, Statement, StatementCode, TopLevel, Type, Unit,
};
use std::fmt::Display;
use std::iter::Peekable;

pub const RESERVED_WORDS: [&str; 4] = ["return", "break", "if", "while"];

#[derive(Debug)]
pub enum Error {
    UnexpectedToken(Token, &'static str),
    UnexpectedEndOfStream(&'static str),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnexpectedToken(tk, msg) => {
                write!(f, "Unexpected token: '{}': expected {}", tk, msg)
            }
            Error::UnexpectedEndOfStream(msg) => {
                write!(f, "Unexpectedly encountered end of stream: expected {}", msg)
            }
        }
    }
}

fn ident_from(word: String, what: &'static str) -> Result<String, Error> {
    if RESERVED_WORDS.contains(&word.as_str()) {
        return Err(Error::UnexpectedToken(Token::Word(word), what));
    }
    Ok(word)
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

    fn expect_ident(&mut self, what: &'static str) -> Result<String, Located<Error>> {
        Ok(self
            .next_expect(what)?
            .try_map(|tk| match tk {
                Token::Word(word) => ident_from(word, what),
                tk => Err(Error::UnexpectedToken(tk, what)),
            })?
            .value())
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

    fn parse_operand(&mut self, what: &'static str) -> Result<Operand, Located<Error>> {
        Ok(self
            .next_expect(what)?
            .try_map(|tk| match tk {
                Token::Num(val) => Ok(Operand::Lit(val)),
                Token::Word(word) => Ok(Operand::Var(ident_from(word, what)?)),
                tk => Err(Error::UnexpectedToken(tk, what)),
            })?
            .value())
    }

    /// Arguments of a call, starting just after the callee's name.
    fn parse_args(&mut self) -> Result<Vec<Operand>, Located<Error>> {
        self.expect(Token::ParenOpen, "'(' opening the argument list")?;

        let mut args = Vec::new();
        if let Some(Token::ParenClose) = self.peek() {
            self.tokens.next();
            return Ok(args);
        }

        loop {
            args.push(self.parse_operand("an argument")?);

            let tk = self.next_expect("',' or ')' in the argument list")?;
            match tk.value {
                Token::Comma => (),
                Token::ParenClose => return Ok(args),
                other => {
                    return Err(Located {
                        loc: tk.loc,
                        value: Error::UnexpectedToken(other, "',' or ')' in the argument list"),
                    })
                }
            }
        }
    }

    fn parse_condition(&mut self) -> Result<Operand, Located<Error>> {
        self.expect(Token::ParenOpen, "'(' opening the condition")?;
        let cond = self.parse_operand("a condition value")?;
        self.expect(Token::ParenClose, "')' closing the condition")?;
        Ok(cond)
    }

    /// Statements up to and including the '}' that closes the block.
    fn parse_block(&mut self) -> Result<Vec<Statement>, Located<Error>> {
        let mut stmts = Vec::new();
        loop {
            let tk = self.next_expect("a statement or '}'")?;
            if tk.value == Token::BraceClose {
                return Ok(stmts);
            }
            stmts.push(self.parse_statement(tk)?);
        }
    }

    fn parse_statement(&mut self, first: Located<Token>) -> Result<Statement, Located<Error>> {
        let line = first.loc.map_or(0, |loc| loc.line as Word);
        let loc = first.loc;

        let word = match first.value {
            Token::Word(word) => word,
            tk => {
                return Err(Located {
                    loc,
                    value: Error::UnexpectedToken(tk, "a statement"),
                })
            }
        };

        let code = match word.as_str() {
            "byte" => {
                let name = self.expect_ident("a variable name")?;
                self.expect(Token::Semi, "';' after the variable declaration")?;
                StatementCode::Declare(name)
            }
            "return" => {
                if let Some(Token::Semi) = self.peek() {
                    self.tokens.next();
                    StatementCode::ReturnVoid
                } else {
                    let value = self.parse_operand("a return value")?;
                    self.expect(Token::Semi, "';' after the return value")?;
                    StatementCode::ReturnValue(value)
                }
            }
            "break" => {
                self.expect(Token::Semi, "';' after 'break'")?;
                StatementCode::Break
            }
            "if" => {
                let cond = self.parse_condition()?;
                self.expect(Token::BraceOpen, "'{' opening the if body")?;
                StatementCode::If {
                    cond,
                    body: self.parse_block()?,
                }
            }
            "while" => {
                let cond = self.parse_condition()?;
                self.expect(Token::BraceOpen, "'{' opening the while body")?;
                StatementCode::While {
                    cond,
                    body: self.parse_block()?,
                }
            }
            _ => {
                let ident =
                    ident_from(word, "a statement").map_err(|err| Located { loc, value: err })?;
                self.parse_ident_statement(ident)?
            }
        };

        Ok(Statement::new(code, line))
    }

    /// A statement opening with a bare identifier: either a call or an
    /// assignment (possibly from a call).
    fn parse_ident_statement(&mut self, ident: String) -> Result<StatementCode, Located<Error>> {
        match self.peek() {
            Some(Token::ParenOpen) => {
                let call = Call::new(ident, self.parse_args()?);
                self.expect(Token::Semi, "';' after the call")?;
                Ok(StatementCode::Call(call))
            }
            _ => {
                self.expect(Token::Equals, "'=' or '(' after the identifier")?;

                let tk = self.next_expect("a value or call")?;
                let loc = tk.loc;
                let code = match tk.value {
                    Token::Num(val) => StatementCode::Assign {
                        var: ident,
                        value: Operand::Lit(val),
                    },
                    Token::Word(word) => {
                        let name = ident_from(word, "a value or call")
                            .map_err(|err| Located { loc, value: err })?;
                        if let Some(Token::ParenOpen) = self.peek() {
                            StatementCode::AssignCall {
                                var: ident,
                                call: Call::new(name, self.parse_args()?),
                            }
                        } else {
                            StatementCode::Assign {
                                var: ident,
                                value: Operand::Var(name),
                            }
                        }
                    }
                    tk => {
                        return Err(Located {
                            loc,
                            value: Error::UnexpectedToken(tk, "a value or call"),
                        })
                    }
                };

                self.expect(Token::Semi, "';' after the assignment")?;
                Ok(code)
            }
        }
    }

    fn parse_params(&mut self) -> Result<Vec<String>, Located<Error>> {
        self.expect(Token::ParenOpen, "'(' opening the parameter list")?;

        let mut params = Vec::new();
        if let Some(Token::ParenClose) = self.peek() {
            self.tokens.next();
            return Ok(params);
        }

        loop {
            self.expect(
                Token::Word("byte".to_owned()),
                "the 'byte' parameter type",
            )?;
            params.push(self.expect_ident("a parameter name")?);

            let tk = self.next_expect("',' or ')' in the parameter list")?;
            match tk.value {
                Token::Comma => (),
                Token::ParenClose => return Ok(params),
                other => {
                    return Err(Located {
                        loc: tk.loc,
                        value: Error::UnexpectedToken(other, "',' or ')' in the parameter list"),
                    })
                }
            }
        }
    }

    fn parse_top_level(&mut self) -> Result<Option<TopLevel>, Located<Error>> {
        let tk = match self.tokens.next() {
            None => return Ok(None),
            Some(tk) => tk,
        };
        let loc = tk.loc;

        let item = match tk.value {
            Token::Word(word) => {
                if word == "import" {
                    let file = self.expect_str("an import file name")?;
                    self.expect(Token::Semi, "';' after the import")?;
                    return Ok(Some(TopLevel::Import(file)));
                }

                let returns = match word.as_str() {
                    "byte" => Type::Byte,
                    "void" => Type::Void,
                    _ => {
                        return Err(Located {
                            loc,
                            value: Error::UnexpectedToken(
                                Token::Word(word),
                                "'import' or a return type ('byte' or 'void')",
                            ),
                        })
                    }
                };

                let name = self.expect_ident("a function name")?;
                let proto = Prototype::new(returns, name, self.parse_params()?);

                let tk = self.next_expect("';' or '{' after the function signature")?;
                match tk.value {
                    Token::Semi => TopLevel::Declare(proto),
                    Token::BraceOpen => TopLevel::Define(FunctionDef::new(proto, self.parse_block()?)),
                    other => {
                        return Err(Located {
                            loc: tk.loc,
                            value: Error::UnexpectedToken(
                                other,
                                "';' or '{' after the function signature",
                            ),
                        })
                    }
                }
            }
            tk => {
                return Err(Located {
                    loc,
                    value: Error::UnexpectedToken(tk, "an import or function"),
                })
            }
        };

        Ok(Some(item))
    }
}

pub fn parse(tokens: Vec<Located<Token>>) -> Result<Unit, Located<Error>> {
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
    };

    let mut unit = Vec::new();
    while let Some(item) = parser.parse_top_level()? {
        unit.push(item);
    }
    Ok(unit)
}
