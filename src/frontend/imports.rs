use super::types::Error;
use crate::sym::{
    self,
    model::{TopLevel, Unit},
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Load a unit with its imports resolved away: each `import` is
/// replaced by the signatures of the functions its file provides,
/// found recursively, with every file contributing at most once.
pub fn load_unit(path: &Path) -> Result<Unit, Error> {
    let mut seen = HashSet::new();
    seen.insert(canonical(path)?);

    let unit = parse_file(path)?;
    resolve(unit, parent(path), &mut seen)
}

fn resolve(unit: Unit, dir: &Path, seen: &mut HashSet<PathBuf>) -> Result<Unit, Error> {
    let mut out = Vec::new();
    for top in unit {
        match top {
            TopLevel::Import(file) => {
                let target = dir.join(&file);
                if !seen.insert(canonical(&target)?) {
                    continue;
                }

                let imported = resolve(parse_file(&target)?, parent(&target), seen)?;
                out.extend(imported.into_iter().map(signature_only));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Only the signatures of an imported unit become visible to the
/// importer; the code itself is brought in at link time.
fn signature_only(top: TopLevel) -> TopLevel {
    match top {
        TopLevel::Define(def) => TopLevel::Declare(def.proto),
        other => other,
    }
}

fn parse_file(path: &Path) -> Result<Unit, Error> {
    let source = super::read_file(path)?;
    Ok(sym::parse_source(&source)?)
}

fn canonical(path: &Path) -> Result<PathBuf, Error> {
    path.canonicalize().map_err(|cause| Error::Read {
        path: path.to_owned(),
        cause,
    })
}

fn parent(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}
