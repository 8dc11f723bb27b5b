use clap::Parser;

use crate::cli::{CliArgs, Commands};

mod cli;
mod commands;
mod progress_bar;

pub type CliResult<T> = deepdata_core::Result<T>;

fn main() -> CliResult<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let settings = args.settings;

    match args.command {
        Commands::Embed(embed) => embed.run(&settings),
        Commands::Extract(extract) => extract.run(&settings),
        Commands::Capacity(capacity) => capacity.run(&settings),
    }
}
