//! Location tracking and the raw scanner shared by the language
//! frontends. The scanner splits a source text into string slices;
//! giving those slices meaning is each frontend's job.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    pub line: usize,
    pub col: usize,
}

impl Loc {
    pub fn new(line: usize, col: usize) -> Loc {
        Loc { line, col }
    }
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(line: {}, col: {})", self.line, self.col)
    }
}

/// A value carrying an optional source position. Errors bubble up
/// through the phases as `Located<E>` so the frontend can report where
/// in the source text they arose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub loc: Option<Loc>,
    pub value: T,
}

impl<T> Located<T> {
    pub fn new(value: T) -> Located<T> {
        Located { loc: None, value }
    }

    pub fn with_loc(loc: Loc, value: T) -> Located<T> {
        Located {
            loc: Some(loc),
            value,
        }
    }

    pub fn value(self) -> T {
        self.value
    }

    /// Adopt `loc` if we don't already have a more precise position.
    pub fn proximate_to(self, loc: Option<Loc>) -> Located<T> {
        Located {
            loc: self.loc.or(loc),
            value: self.value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Located<U> {
        Located {
            loc: self.loc,
            value: f(self.value),
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Located<U>, Located<E>> {
        let loc = self.loc;
        match f(self.value) {
            Ok(value) => Ok(Located { loc, value }),
            Err(err) => Err(Located { loc, value: err }),
        }
    }
}

impl<T> From<T> for Located<T> {
    fn from(value: T) -> Located<T> {
        Located::new(value)
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.loc {
            Some(loc) => write!(f, "@{}: {}", loc, self.value),
            None => self.value.fmt(f),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    UnterminatedStringLiteral,
    MalformedComment,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnterminatedStringLiteral => {
                write!(f, "Encountered unterminated string literal")
            }
            Error::MalformedComment => write!(f, "Expected a second '/' to begin a comment"),
        }
    }
}

/// Classifies a raw slice by a marker it contains, starts with, or
/// ends with. Frontends build their token dispatch tables from these.
pub enum CommandChar<'a> {
    Containing(&'a str),
    Starting(&'a str),
    Ending(&'a str),
}

impl<'a> CommandChar<'a> {
    pub fn matches<'b>(&self, s: &'b str) -> Option<&'b str> {
        match self {
            CommandChar::Containing(c) => {
                if s.contains(c) {
                    Some(s)
                } else {
                    None
                }
            }
            CommandChar::Starting(c) => {
                if s.starts_with(c) {
                    Some(&s[c.len()..])
                } else {
                    None
                }
            }
            CommandChar::Ending(c) => {
                if s.ends_with(c) {
                    Some(&s[..s.len() - c.len()])
                } else {
                    None
                }
            }
        }
    }
}

/// The punctuation alphabet of a frontend. `name_suffix` names a punct
/// which, when it ends a name, stays glued to it rather than lexing
/// alone (the ':' of a label definition).
pub struct Lexicon {
    pub puncts: &'static [char],
    pub name_suffix: Option<char>,
}

const COMMENT_CHAR: char = '/';
const NEWLINE_CHAR: char = '\n';
const STRING_LITERAL_CHAR: char = '"';

#[derive(Debug, PartialEq, Eq)]
pub enum RawToken<'a> {
    Value(Located<&'a str>),
    Nothing,
    EndOfStream,
}

enum TerminatorKind {
    Hard,
    Whitespace,
    Punct(char),
}

impl TerminatorKind {
    /// Note that we don't have to check whether invalid characters
    /// are present at this stage, this occurs when the raw slices
    /// are converted into each frontend's tokens.
    fn from_char(lexicon: &Lexicon, c: Option<char>) -> Option<Self> {
        match c {
            None | Some(COMMENT_CHAR) | Some(NEWLINE_CHAR) => Some(TerminatorKind::Hard),
            Some(c) if lexicon.puncts.contains(&c) => Some(TerminatorKind::Punct(c)),
            Some(c) => {
                if c.is_whitespace() {
                    Some(TerminatorKind::Whitespace)
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug)]
enum SeekMode {
    Whitespace,
    StringLiteral,
    Punct,
    Name,
}

impl SeekMode {
    fn classify(lexicon: &Lexicon, c: char) -> Self {
        match c {
            STRING_LITERAL_CHAR => SeekMode::StringLiteral,
            c if lexicon.puncts.contains(&c) => SeekMode::Punct,
            c => {
                if c.is_whitespace() {
                    SeekMode::Whitespace
                } else {
                    SeekMode::Name
                }
            }
        }
    }

    fn should_terminate(&self, lexicon: &Lexicon, cur: Option<char>) -> Result<Option<SeekEnd>, Error> {
        match (self, TerminatorKind::from_char(lexicon, cur)) {
            (SeekMode::Whitespace, Some(TerminatorKind::Whitespace)) => Ok(None),
            (SeekMode::Whitespace, _) => Ok(Some(SeekEnd::Skip)),
            // String literals may contain every character except the
            // quote itself, including '/', so `TerminatorKind` does not
            // apply inside one.
            (SeekMode::StringLiteral, _) => match cur {
                Some(STRING_LITERAL_CHAR) => Ok(Some(SeekEnd::AdvanceOne)),
                None => Err(Error::UnterminatedStringLiteral),
                _ => Ok(None),
            },
            (SeekMode::Punct, _) => Ok(Some(SeekEnd::Current)),
            (SeekMode::Name, Some(TerminatorKind::Punct(c))) if lexicon.name_suffix == Some(c) => {
                Ok(Some(SeekEnd::AdvanceOne))
            }
            (SeekMode::Name, Some(_)) => Ok(Some(SeekEnd::Current)),
            (SeekMode::Name, None) => Ok(None),
        }
    }
}

enum SeekEnd {
    Current,
    AdvanceOne,
    Skip,
}

impl SeekEnd {
    fn build_raw_token<F>(
        self,
        line_no: usize,
        line: &'_ str,
        start_idx: usize,
        cur_idx: Option<usize>,
        advance: F,
    ) -> RawToken<'_>
    where
        F: FnOnce() -> Option<usize>,
    {
        let end_idx = match self {
            SeekEnd::Skip => return RawToken::Nothing,
            SeekEnd::Current => cur_idx,
            SeekEnd::AdvanceOne => advance(),
        }
        .unwrap_or_else(|| line.len());

        if end_idx == start_idx {
            return RawToken::Nothing;
        }

        RawToken::Value(Located::with_loc(
            Loc::new(line_no, start_idx + 1),
            &line[start_idx..end_idx],
        ))
    }
}

impl<'a> RawToken<'a> {
    fn consume_one<'b>(
        lexicon: &Lexicon,
        line_no: usize,
        line: &'b str,
        chars: &mut std::iter::Peekable<impl Iterator<Item = (usize, char)> + 'b>,
    ) -> Result<RawToken<'b>, Located<Error>> {
        match chars.next() {
            None => Ok(RawToken::EndOfStream),
            // Comments run to the end of the line and need a double-'/' opener.
            Some((col_start, COMMENT_CHAR)) => match chars.peek().copied() {
                Some((_, COMMENT_CHAR)) => Ok(RawToken::EndOfStream),
                _ => Err(Located::with_loc(
                    Loc::new(line_no, col_start + 1),
                    Error::MalformedComment,
                )),
            },
            Some((col_start, c)) => {
                let sm = SeekMode::classify(lexicon, c);
                loop {
                    let (idx, c) = match chars.peek().copied() {
                        Some((idx, c)) => (Some(idx), Some(c)),
                        None => (None, None),
                    };

                    if let Some(seek) = sm.should_terminate(lexicon, c)? {
                        return Ok(seek.build_raw_token(line_no, line, col_start, idx, || {
                            chars.next();
                            chars.peek().copied().map(|(idx, _)| idx)
                        }));
                    }

                    chars.next();
                }
            }
        }
    }

    fn line_to_iter<'l>(
        lexicon: &'static Lexicon,
        line_no: usize,
        line: &'l str,
    ) -> impl Iterator<Item = Result<Located<&'l str>, Located<Error>>> {
        let mut chars = line.char_indices().peekable();
        std::iter::from_fn(move || -> Option<Result<Located<&str>, Located<Error>>> {
            loop {
                match RawToken::consume_one(lexicon, line_no, line, &mut chars) {
                    Ok(RawToken::Nothing) => (),
                    Ok(RawToken::EndOfStream) => return None,
                    Ok(RawToken::Value(slice)) => return Some(Ok(slice)),
                    Err(err) => return Some(Err(err)),
                }
            }
        })
    }
}

/// Split a source text into raw token slices, each carrying its
/// position. Comments and inter-token whitespace disappear here.
pub fn scan<'a>(
    lexicon: &'static Lexicon,
    source: &'a str,
) -> impl Iterator<Item = Result<Located<&'a str>, Located<Error>>> {
    // NOTE If we want to support multi-line string literals, we can't just use `lines()` here.
    source
        .lines()
        .enumerate()
        .flat_map(move |(line_no, line)| RawToken::line_to_iter(lexicon, line_no + 1, line))
}

#[cfg(test)]
mod tests {
    use super::{Lexicon, Loc, Located, RawToken};

    static LEXICON: Lexicon = Lexicon {
        puncts: &['[', ']', '{', '}', ':'],
        name_suffix: Some(':'),
    };

    fn consume<'a>(
        line: &'a str,
        chars: &mut std::iter::Peekable<std::str::CharIndices<'a>>,
    ) -> RawToken<'a> {
        RawToken::consume_one(&LEXICON, 0, line, chars).unwrap()
    }

    #[test]
    fn consume_single_simple() {
        let line = "GotoOp #loop";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "GotoOp"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::Nothing);
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 8), "#loop"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_comment() {
        let line = "StpCpu // my comment text";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "StpCpu"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::Nothing);
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_comment_nospace() {
        let line = "StpCpu//my comment text";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "StpCpu"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_comment_no_chars() {
        let line = "StpCpu//";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "StpCpu"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_comment_start() {
        let line = "//";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    #[should_panic]
    fn consume_single_lone_slash() {
        let line = "/";
        let mut line_it = line.char_indices().peekable();
        drop(consume(line, &mut line_it));
    }

    #[test]
    fn consume_single_name_one() {
        let line = "M";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "M"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_name_one_then_space() {
        let line = "M ";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "M"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::Nothing);
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_name_one_space() {
        let line = " ";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(consume(line, &mut line_it), RawToken::Nothing);
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_nothing() {
        let line = "";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_name_suffix() {
        let line = "loop: StpCpu";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "loop:"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::Nothing);
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 7), "StpCpu"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_puncts() {
        let line = "[]{}";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "["))
        );
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 2), "]"))
        );
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 3), "{"))
        );
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 4), "}"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_string_colon_num() {
        let line = "\"input.sym\":12";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "\"input.sym\""))
        );
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 12), ":"))
        );
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 13), "12"))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_string_with_spaces() {
        let line = "\"byte x;\" \"x = f(y);\" ";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "\"byte x;\""))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::Nothing);
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 11), "\"x = f(y);\""))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::Nothing);
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_string_slash_inside() {
        let line = "\"dir/input.sym\"";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "\"dir/input.sym\""))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_string_adjacent() {
        let line = "\"hello there\"\"hi there\" ";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 1), "\"hello there\""))
        );
        assert_eq!(
            consume(line, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(0, 14), "\"hi there\""))
        );
        assert_eq!(consume(line, &mut line_it), RawToken::Nothing);
        assert_eq!(consume(line, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    #[should_panic]
    fn consume_single_string_unterminated_1() {
        let line = "\"";
        let mut line_it = line.char_indices().peekable();
        drop(consume(line, &mut line_it));
    }

    #[test]
    #[should_panic]
    fn consume_single_string_unterminated_2() {
        let line = "\"te";
        let mut line_it = line.char_indices().peekable();
        drop(consume(line, &mut line_it));
    }
}
