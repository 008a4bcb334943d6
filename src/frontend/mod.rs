//! File-level drivers shared by the command line and the test suites:
//! read sources, run the pipelines, write outputs.

mod imports;

pub mod assemble;
pub mod compile;
pub mod debug;
pub mod link;
pub mod types;

pub use types::Error;

use std::path::Path;

fn read_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|cause| Error::Read {
        path: path.to_owned(),
        cause,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    std::fs::write(path, contents).map_err(|cause| Error::Write {
        path: path.to_owned(),
        cause,
    })
}
