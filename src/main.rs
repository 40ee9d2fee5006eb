mod amounts;
mod classifier;
mod cli;
mod columns;
mod confidence;
mod dates;
mod error;
mod extract;
mod fmt;
mod loader;
mod mixed;
mod models;
mod resolver;
mod selector;
mod summary;
mod table;
mod vocab;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sheets { file } => cli::sheets::run(&file),
        Commands::Inspect { file, sheet } => cli::inspect::run(&file, &sheet),
        Commands::Extract {
            file,
            sheet,
            format,
            year,
            output,
        } => cli::extract::run(&file, &sheet, format, year, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
