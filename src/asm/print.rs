use crate::asm::model::{DebugContext, Item, Program};
use crate::spec::types::hw::Word;

const INDENT: &str = "    ";
const IMAGE_HEADER: &str = "v2.0 raw";
const IMAGE_WORDS_PER_LINE: usize = 16;

fn push_context(out: &mut String, ctx: &DebugContext) {
    out.push_str(&format!("[ \"{}\"", ctx.description));

    if let Some(source) = &ctx.source {
        out.push_str(&format!(" \"{}\":{}", source.file, source.line));
    }

    if !ctx.variables.is_empty() {
        out.push_str(" {");
        for (name, offset) in &ctx.variables {
            out.push_str(&format!(" \"{}\":{}", name, offset));
        }
        out.push_str(" }");
    }

    if let Some(frame_size) = ctx.frame_size {
        out.push_str(&format!(" {}", frame_size));
    }

    out.push_str(" ]");
}

/// Render a program back to source form, one item per line, with
/// section markers as indented brace lines.
pub fn to_source(prog: &Program) -> String {
    let mut out = String::new();
    let mut depth = 0usize;

    for item in prog {
        if let Item::EndSection = item {
            depth = depth.saturating_sub(1);
        }

        for _ in 0..depth {
            out.push_str(INDENT);
        }

        match item {
            Item::Label(label) => {
                out.push_str(label);
                out.push(':');
            }
            Item::Inst(inst) => out.push_str(&inst.to_string()),
            Item::Context(ctx) => push_context(&mut out, ctx),
            Item::StartSection => {
                out.push('{');
                depth += 1;
            }
            Item::EndSection => out.push('}'),
        }

        out.push('\n');
    }

    out
}

/// Render an encoded word image in the ROM file format: a header line,
/// then unpadded lowercase hex words, sixteen to a line.
pub fn to_image(words: &[Word]) -> String {
    let mut out = String::from(IMAGE_HEADER);
    out.push('\n');

    for (idx, word) in words.iter().enumerate() {
        out.push_str(&format!("{:x}", word));
        if idx % IMAGE_WORDS_PER_LINE == IMAGE_WORDS_PER_LINE - 1 {
            out.push('\n');
        } else {
            out.push(' ');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::model::{Inst, SourceLine, Value};

    #[test]
    fn source_round_trip() {
        let text = "\
__function__void__main:
{
    [ \"void main(){\" { \"x\":2 } 3 ]
    RegReg 0 1
    {
        [ \"byte x;\" \"main.sym\":2 { \"x\":2 } 3 ]
        SetReg 2 0
        [ \"return;\" \"main.sym\":3 { \"x\":2 } 3 ]
        SetReg 0 0
        PrRmRg 3
        SetReg 0 1
        PrRmRg 0
        PrGoto
    }
}
";
        let prog = crate::asm::parse_source(text).unwrap();
        assert_eq!(to_source(&prog), text);
    }

    #[test]
    fn source_shows_operands_in_source_order() {
        let prog = vec![
            Item::Inst(Inst::RegRam {
                reg: Value::Literal(3),
                mem: Value::Literal(100),
            }),
            Item::Inst(Inst::SetReg {
                reg: Value::Literal(2),
                val: Value::Reference("spot".to_owned()),
            }),
            Item::Label("spot".to_owned()),
        ];
        assert_eq!(to_source(&prog), "RegRam 3 100\nSetReg 2 #spot\nspot:\n");
    }

    #[test]
    fn context_with_source_line() {
        let prog = vec![Item::Context(crate::asm::model::DebugContext {
            description: "x = f(y);".to_owned(),
            source: Some(SourceLine::new("main.sym".to_owned(), 7)),
            variables: vec![("x".to_owned(), 2), ("y".to_owned(), 3)],
            frame_size: Some(4),
        })];
        assert_eq!(
            to_source(&prog),
            "[ \"x = f(y);\" \"main.sym\":7 { \"x\":2 \"y\":3 } 4 ]\n"
        );
    }

    #[test]
    fn image_format() {
        let words = (0..20).collect::<Vec<Word>>();
        assert_eq!(
            to_image(&words),
            "v2.0 raw\n0 1 2 3 4 5 6 7 8 9 a b c d e f\n10 11 12 13 "
        );
    }

    #[test]
    fn image_hex_is_unpadded() {
        assert_eq!(to_image(&[0xFFFF, 0, 0xB]), "v2.0 raw\nffff 0 b ");
    }
}
