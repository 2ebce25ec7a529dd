pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::seed::SeedMode;

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront operator CLI",
    long_about = "Migrate the catalog database, import or seed products, inspect configuration, \
                  and check runtime readiness.",
    after_help = "Examples:\n  storefront migrate\n  storefront import --file products.json\n  \
                  storefront seed --verify\n  storefront doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Upsert every product from a flat JSON catalog file")]
    Import {
        #[arg(long, value_name = "PATH", help = "Catalog file: a JSON array of product records")]
        file: PathBuf,
    },
    #[command(about = "Load, verify, or remove the bundled demo catalog")]
    Seed {
        #[arg(long, conflicts_with = "clean", help = "Only check that the demo products exist")]
        verify: bool,
        #[arg(long, help = "Remove the demo products")]
        clean: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, database connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Import { file } => commands::import::run(&file),
        Command::Seed { verify, clean } => commands::seed::run(SeedMode::from_flags(verify, clean)),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
