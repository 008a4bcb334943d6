use super::types::Error;
use crate::asm::model::{DebugContext, Item, Program};
use crate::spec::types::hw::Word;

/// Compiler-emitted function entry labels begin with `__function`;
/// return labels begin with `__functionReturn` and must not reset the
/// per-function scan below.
fn is_function_entry(label: &str) -> bool {
    label.starts_with("__function") && !label.starts_with("__functionReturn")
}

/// The debug context in force at instruction index `target`: the last
/// `Context` item seen before the instruction is reached, counting
/// only `Inst` items towards the index.
pub fn context_at(program: &Program, target: Word) -> Result<DebugContext, Error> {
    let target = i64::from(target);

    let mut current: i64 = -1;
    let mut last: Option<&DebugContext> = None;
    for item in program {
        if current == target {
            break;
        }

        match item {
            Item::Inst(_) => current += 1,
            Item::Context(context) => last = Some(context),
            _ => (),
        }
    }

    if current != target {
        return Err(Error::MissingContext);
    }

    Ok(last.cloned().unwrap_or_default())
}

/// The context of the function containing instruction index `target`:
/// the first `Context` item after the enclosing function entry label.
pub fn function_context_at(program: &Program, target: Word) -> Result<DebugContext, Error> {
    let target = i64::from(target);

    let mut current: i64 = -1;
    let mut last: Option<&DebugContext> = None;
    for item in program {
        if current == target {
            break;
        }

        match item {
            Item::Label(name) if is_function_entry(name) => last = None,
            Item::Inst(_) => current += 1,
            Item::Context(context) => {
                if last.is_none() {
                    last = Some(context);
                }
            }
            _ => (),
        }
    }

    if current != target {
        return Err(Error::MissingContext);
    }

    Ok(last.cloned().unwrap_or_default())
}
