use crate::lex::{self, CommandChar, Lexicon, Located};
use crate::spec::types::hw::{OpCode, Word};
use std::fmt::Display;
use std::num::ParseIntError;
use strum::IntoEnumIterator;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    MalformedToken(String, &'static str),
    UnterminatedStringLiteral,
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Error::MalformedToken(err.to_string(), "could not parse numeric")
    }
}

impl From<lex::Error> for Error {
    fn from(err: lex::Error) -> Self {
        match err {
            lex::Error::UnterminatedStringLiteral => Error::UnterminatedStringLiteral,
            lex::Error::MalformedComment => Error::MalformedToken(
                "/".to_owned(),
                "expected a second '/' to begin a comment",
            ),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedToken(raw, msg) => write!(f, "Malformed token '{}': {}", raw, msg),
            Error::UnterminatedStringLiteral => {
                write!(f, "Encountered unterminated string literal")
            }
        }
    }
}

static LEXICON: Lexicon = Lexicon {
    puncts: &['[', ']', '{', '}', ':'],
    name_suffix: Some(':'),
};

// This enum models the kinds of tokens we can encounter and unambiguously distinguish between
// as we lex the stream. It *does not* model the grammar, where e.g. there is a distinction
// between an instruction mnemonic and the description string opening a context block
// (which for us is inferred from context).
#[derive(Debug, PartialEq, Eq)]
pub enum Token {
    LabelDef(String),
    Ref(String),

    Num(Word),
    Str(String),
    Name(String),

    ContextOpen,
    ContextClose,
    BraceOpen,
    BraceClose,
    Colon,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LabelDef(label) => write!(f, "LabelDef({})", label),
            Token::Ref(name) => write!(f, "Ref({})", name),

            Token::Num(val) => write!(f, "Num({})", val),
            Token::Str(s) => write!(f, "Str({})", s),
            Token::Name(s) => write!(f, "Name({})", s),

            Token::ContextOpen => write!(f, "["),
            Token::ContextClose => write!(f, "]"),
            Token::BraceOpen => write!(f, "{{"),
            Token::BraceClose => write!(f, "}}"),
            Token::Colon => write!(f, ":"),
        }
    }
}

type CommandCharHandler = (CommandChar<'static>, fn(&str) -> Result<Token, Error>);

impl Token {
    const COMMAND_CHARS: [CommandCharHandler; 8] = [
        (CommandChar::Starting("\""), Token::parse_string),
        (CommandChar::Containing(" "), Token::parse_error),
        (CommandChar::Starting("["), |_| Ok(Token::ContextOpen)),
        (CommandChar::Starting("]"), |_| Ok(Token::ContextClose)),
        (CommandChar::Starting("{"), |_| Ok(Token::BraceOpen)),
        (CommandChar::Starting("}"), |_| Ok(Token::BraceClose)),
        (CommandChar::Starting("#"), Token::parse_ref),
        (CommandChar::Ending(":"), Token::parse_label_def),
    ];

    fn parse(raw: &str) -> Result<Self, Error> {
        assert!(!raw.is_empty());

        for (c, parser) in Token::COMMAND_CHARS.iter() {
            if let Some(raw) = c.matches(raw) {
                return parser(raw);
            }
        }

        if raw.starts_with(|c: char| c.is_ascii_digit()) {
            return Token::parse_numeric(raw);
        }

        Token::parse_name(raw)
    }

    fn parse_error(raw: &str) -> Result<Self, Error> {
        Err(Error::MalformedToken(raw.to_owned(), "unexpected token"))
    }

    fn parse_label_def(raw: &str) -> Result<Self, Error> {
        // A bare ':' lexes through here with nothing in front of it.
        if raw.is_empty() {
            return Ok(Token::Colon);
        }

        Ok(Token::LabelDef(Token::parse_label_string(raw)?))
    }

    fn parse_ref(raw: &str) -> Result<Self, Error> {
        Ok(Token::Ref(Token::parse_label_string(raw)?))
    }

    fn parse_label_string(label: &str) -> Result<String, Error> {
        let label = Token::parse_name_string(label)?;

        if OpCode::iter().any(|op| op.to_string() == label) {
            return Err(Error::MalformedToken(
                label,
                "instruction mnemonics cannot be used as label names",
            ));
        }

        Ok(label)
    }

    fn parse_numeric(raw: &str) -> Result<Self, Error> {
        let val = if raw.starts_with("0x") {
            Word::from_str_radix(&raw[2..], 16)
        } else if raw.starts_with("0b") {
            Word::from_str_radix(&raw[2..], 2)
        } else {
            Word::from_str_radix(raw, 10)
        }?;

        Ok(Token::Num(val))
    }

    fn parse_string(raw: &str) -> Result<Self, Error> {
        if !raw.ends_with('"') {
            return Err(Error::MalformedToken(
                raw.to_owned(),
                "no terminating '\"' while parsing string literal",
            ));
        }

        Ok(Token::Str(raw[0..raw.len() - 1].to_owned()))
    }

    fn parse_name(raw: &str) -> Result<Self, Error> {
        Ok(Token::Name(Token::parse_name_string(raw)?))
    }

    fn parse_name_string(raw: &str) -> Result<String, Error> {
        if raw.is_empty() {
            return Err(Error::MalformedToken(
                raw.to_owned(),
                "names must have nonzero length",
            ));
        }

        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::MalformedToken(
                raw.to_owned(),
                "names may only contain letters, digits, and '_'",
            ));
        }

        Ok(raw.to_owned())
    }
}

/// The grammar is whitespace-insensitive between tokens, so the lexed
/// stream is flat rather than line-structured. Line and column survive
/// in each token's `Loc`.
pub fn tokenize(source: &str) -> Result<Vec<Located<Token>>, Located<Error>> {
    lex::scan(&LEXICON, source)
        .map(|raw| {
            raw.map_err(|err| err.map(Error::from))?
                .try_map(Token::parse)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Located, Token};
    use crate::spec::types::hw::Word;

    #[test]
    fn parse_label_and_ref() {
        assert_eq!(
            Token::parse("loop:").unwrap(),
            Token::LabelDef("loop".to_owned())
        );
        assert_eq!(
            Token::parse("#loop").unwrap(),
            Token::Ref("loop".to_owned())
        );
        assert_eq!(Token::parse(":").unwrap(), Token::Colon);
        assert!(Token::parse("GotoOp:").is_err());
        assert!(Token::parse("#SetReg").is_err());
        assert!(Token::parse("#bad-name").is_err());
    }

    #[test]
    fn parse_numerics() {
        assert_eq!(Token::parse("0").unwrap(), Token::Num(0));
        assert_eq!(Token::parse("42").unwrap(), Token::Num(42));
        assert_eq!(Token::parse("0x2A").unwrap(), Token::Num(42));
        assert_eq!(Token::parse("0b101010").unwrap(), Token::Num(42));
        assert_eq!(Token::parse("65535").unwrap(), Token::Num(Word::max_value()));
        assert!(Token::parse("65536").is_err());
        assert!(Token::parse("12monkeys").is_err());
    }

    #[test]
    fn parse_strings_and_names() {
        assert_eq!(
            Token::parse("\"byte x;\"").unwrap(),
            Token::Str("byte x;".to_owned())
        );
        assert_eq!(Token::parse("\"\"").unwrap(), Token::Str("".to_owned()));
        assert_eq!(
            Token::parse("SetReg").unwrap(),
            Token::Name("SetReg".to_owned())
        );
        assert_eq!(
            Token::parse("__function__void__main").unwrap(),
            Token::Name("__function__void__main".to_owned())
        );
        assert!(Token::parse("ill*formed").is_err());
    }

    #[test]
    fn tokenize_inst_sequence() {
        let tokens = super::tokenize("start:\n    SetReg 0 5\n    GotoOp #start // again\n")
            .unwrap()
            .into_iter()
            .map(Located::value)
            .collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![
                Token::LabelDef("start".to_owned()),
                Token::Name("SetReg".to_owned()),
                Token::Num(0),
                Token::Num(5),
                Token::Name("GotoOp".to_owned()),
                Token::Ref("start".to_owned()),
            ]
        );
    }

    #[test]
    fn tokenize_context_block() {
        let tokens = super::tokenize("[ \"byte x;\" \"main.sym\":3 { \"x\":2 } 3 ]")
            .unwrap()
            .into_iter()
            .map(Located::value)
            .collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![
                Token::ContextOpen,
                Token::Str("byte x;".to_owned()),
                Token::Str("main.sym".to_owned()),
                Token::Colon,
                Token::Num(3),
                Token::BraceOpen,
                Token::Str("x".to_owned()),
                Token::Colon,
                Token::Num(2),
                Token::BraceClose,
                Token::Num(3),
                Token::ContextClose,
            ]
        );
    }

    #[test]
    fn tokenize_locates_tokens() {
        let tokens = super::tokenize("StpCpu\n  GotoOp #start\n").unwrap();
        assert_eq!(tokens[0].loc.unwrap().line, 1);
        assert_eq!(tokens[0].loc.unwrap().col, 1);
        assert_eq!(tokens[1].loc.unwrap().line, 2);
        assert_eq!(tokens[1].loc.unwrap().col, 3);
        assert_eq!(tokens[2].loc.unwrap().col, 10);
    }
}
