use super::suite;
use crate::frontend;
use std::path::PathBuf;
use structopt::StructOpt;

#[cfg(windows)]
pub fn terminal_init() {
    ansi_term::enable_ansi_support().expect("Could enable terminal ANSI support");
}

#[cfg(not(windows))]
pub fn terminal_init() {}

/// The original tool spelled multi-word commands in camelCase; the
/// aliases keep existing scripts working.
#[derive(StructOpt, Debug)]
#[structopt(name = "symtool")]
pub enum CommandRoot {
    Compile(SubcommandCompile),
    #[structopt(alias = "libLink")]
    LibLink(SubcommandLibLink),
    #[structopt(alias = "exeLink")]
    ExeLink(SubcommandExeLink),
    Assemble(SubcommandAssemble),
    Debug(SubcommandDebug),
    #[structopt(alias = "automatedTest")]
    AutomatedTest,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandCompile {
    #[structopt(name = "in.sym", parse(from_os_str), required = true)]
    in_srcs: Vec<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandLibLink {
    #[structopt(name = "out.asm", parse(from_os_str))]
    out: PathBuf,

    #[structopt(name = "in.asm", parse(from_os_str), required = true)]
    ins: Vec<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandExeLink {
    #[structopt(name = "out.asm.out", parse(from_os_str))]
    out: PathBuf,

    #[structopt(name = "in.asm", parse(from_os_str), required = true)]
    ins: Vec<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandAssemble {
    #[structopt(name = "out.rom", parse(from_os_str))]
    out_bin: PathBuf,

    #[structopt(name = "in.asm", parse(from_os_str))]
    in_src: PathBuf,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandDebug {
    #[structopt(name = "in.asm.out", parse(from_os_str))]
    in_src: PathBuf,
}

pub fn root(cmd: CommandRoot) -> anyhow::Result<()> {
    match cmd {
        CommandRoot::Compile(scmd) => compile(scmd),
        CommandRoot::LibLink(scmd) => lib_link(scmd),
        CommandRoot::ExeLink(scmd) => exe_link(scmd),
        CommandRoot::Assemble(scmd) => assemble(scmd),
        CommandRoot::Debug(scmd) => debug(scmd),
        CommandRoot::AutomatedTest => automated_test(),
    }
}

fn compile(cmd: SubcommandCompile) -> anyhow::Result<()> {
    for input in &cmd.in_srcs {
        let out = frontend::compile::compile_path(input)?;
        println!(
            "Successfully compiled \"{}\" to \"{}\"",
            input.display(),
            out.display()
        );
    }

    Ok(())
}

fn lib_link(cmd: SubcommandLibLink) -> anyhow::Result<()> {
    frontend::link::lib_link(&cmd.out, &cmd.ins)?;
    println!("Successfully linked library \"{}\"", cmd.out.display());

    Ok(())
}

fn exe_link(cmd: SubcommandExeLink) -> anyhow::Result<()> {
    frontend::link::exe_link(&cmd.out, &cmd.ins)?;
    println!("Successfully linked executable \"{}\"", cmd.out.display());

    Ok(())
}

fn assemble(cmd: SubcommandAssemble) -> anyhow::Result<()> {
    frontend::assemble::assemble_path(&cmd.out_bin, &cmd.in_src)?;
    println!(
        "Successfully assembled \"{}\" to \"{}\"",
        cmd.in_src.display(),
        cmd.out_bin.display()
    );

    Ok(())
}

fn debug(cmd: SubcommandDebug) -> anyhow::Result<()> {
    frontend::debug::debug_path(&cmd.in_src)?;

    Ok(())
}

fn automated_test() -> anyhow::Result<()> {
    if !suite::run_suite() {
        anyhow::bail!("not all regression cases passed");
    }

    Ok(())
}
