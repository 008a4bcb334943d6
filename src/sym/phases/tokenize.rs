use crate::lex::{self, CommandChar, Lexicon, Located};
use crate::spec::types::hw::Word;
use std::fmt::Display;
use std::num::ParseIntError;

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
    puncts: &['(', ')', '{', '}', ',', ';', '='],
    name_suffix: None,
};

/// Keywords and identifiers both lex as `Word`; telling them apart is
/// the parser's job.
#[derive(Debug, PartialEq, Eq)]
pub enum Token {
    Num(Word),
    Str(String),
    Word(String),

    ParenOpen,
    ParenClose,
    BraceOpen,
    BraceClose,
    Comma,
    Semi,
    Equals,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Num(val) => write!(f, "Num({})", val),
            Token::Str(s) => write!(f, "Str({})", s),
            Token::Word(s) => write!(f, "Word({})", s),

            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::BraceOpen => write!(f, "{{"),
            Token::BraceClose => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::Equals => write!(f, "="),
        }
    }
}

type CommandCharHandler = (CommandChar<'static>, fn(&str) -> Result<Token, Error>);

impl Token {
    const COMMAND_CHARS: [CommandCharHandler; 9] = [
        (CommandChar::Starting("\""), Token::parse_string),
        (CommandChar::Containing(" "), Token::parse_error),
        (CommandChar::Starting("("), |_| Ok(Token::ParenOpen)),
        (CommandChar::Starting(")"), |_| Ok(Token::ParenClose)),
        (CommandChar::Starting("{"), |_| Ok(Token::BraceOpen)),
        (CommandChar::Starting("}"), |_| Ok(Token::BraceClose)),
        (CommandChar::Starting(","), |_| Ok(Token::Comma)),
        (CommandChar::Starting(";"), |_| Ok(Token::Semi)),
        (CommandChar::Starting("="), |_| Ok(Token::Equals)),
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

        Token::parse_word(raw)
    }

    fn parse_error(raw: &str) -> Result<Self, Error> {
        Err(Error::MalformedToken(raw.to_owned(), "unexpected token"))
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

    // Words are strictly alphabetic, unlike the assembly language's
    // names, which also admit digits.
    fn parse_word(raw: &str) -> Result<Self, Error> {
        if !raw.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
            return Err(Error::MalformedToken(
                raw.to_owned(),
                "words may only contain letters and '_'",
            ));
        }

        Ok(Token::Word(raw.to_owned()))
    }
}

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

    #[test]
    fn parse_words_and_numerics() {
        assert_eq!(
            Token::parse("main").unwrap(),
            Token::Word("main".to_owned())
        );
        assert_eq!(
            Token::parse("_loop_var").unwrap(),
            Token::Word("_loop_var".to_owned())
        );
        assert_eq!(Token::parse("0x10").unwrap(), Token::Num(16));
        assert_eq!(Token::parse("7").unwrap(), Token::Num(7));
        assert!(Token::parse("var2").is_err());
        assert!(Token::parse("bad-word").is_err());
    }

    #[test]
    fn tokenize_function_header() {
        let tokens = super::tokenize("byte add(byte a, byte b){")
            .unwrap()
            .into_iter()
            .map(Located::value)
            .collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![
                Token::Word("byte".to_owned()),
                Token::Word("add".to_owned()),
                Token::ParenOpen,
                Token::Word("byte".to_owned()),
                Token::Word("a".to_owned()),
                Token::Comma,
                Token::Word("byte".to_owned()),
                Token::Word("b".to_owned()),
                Token::ParenClose,
                Token::BraceOpen,
            ]
        );
    }

    #[test]
    fn tokenize_statement_with_comment() {
        let tokens = super::tokenize("x = add(x, 1); // bump\n")
            .unwrap()
            .into_iter()
            .map(Located::value)
            .collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![
                Token::Word("x".to_owned()),
                Token::Equals,
                Token::Word("add".to_owned()),
                Token::ParenOpen,
                Token::Word("x".to_owned()),
                Token::Comma,
                Token::Num(1),
                Token::ParenClose,
                Token::Semi,
            ]
        );
    }

    #[test]
    fn tokenize_import() {
        let tokens = super::tokenize("import \"lib/math.sym\";")
            .unwrap()
            .into_iter()
            .map(Located::value)
            .collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![
                Token::Word("import".to_owned()),
                Token::Str("lib/math.sym".to_owned()),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn tokenize_tracks_lines() {
        let tokens = super::tokenize("void main(){\n    return;\n}\n").unwrap();
        let return_word = tokens
            .iter()
            .find(|tk| tk.value == Token::Word("return".to_owned()))
            .unwrap();
        assert_eq!(return_word.loc.unwrap().line, 2);
    }
}
