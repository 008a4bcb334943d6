use structopt::StructOpt;
use symtool::cli::command;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    command::terminal_init();

    command::root(command::CommandRoot::from_args())
}
