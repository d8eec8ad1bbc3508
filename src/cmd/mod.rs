use crate::{pkg::server::listen, prelude::Result};
use clap::{Parser, Subcommand};

mod migrate;

#[derive(Parser)]
#[command(about = "college job board service")]
struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    Listen,
    Migrate,
}

pub async fn run() -> Result<()> {
    let args = Cmd::parse();
    // bare invocation serves
    match args.command.unwrap_or(SubCommandType::Listen) {
        SubCommandType::Listen => listen().await?,
        SubCommandType::Migrate => migrate::apply().await?,
    }
    Ok(())
}
