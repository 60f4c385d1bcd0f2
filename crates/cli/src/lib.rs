pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::purchase::PurchaseArgs;

#[derive(Debug, Parser)]
#[command(
    name = "agribazaar",
    about = "AgriBazaar operator CLI",
    long_about = "Inspect effective configuration and walk a purchase through quantity validation, confirmation, and payment hand-off.",
    after_help = "Examples:\n  agribazaar config\n  agribazaar purchase --name Millet --price 10.00 --stock 5 --quantity 3 --confirm"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Price a purchase draft and optionally confirm or cancel it")]
    Purchase(PurchaseArgs),
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Purchase(args) => commands::purchase::run(&args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
