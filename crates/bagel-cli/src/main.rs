//! Bagel CLI - bulk annotation of BIDS participants tables.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use logging::{init_logging, LogConfig};

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Levels {
            index,
            corpus,
            output,
            dry_run,
        } => commands::levels::run(index, corpus, output, dry_run),

        Commands::Check { file } => commands::check::run(file),

        Commands::Compile {
            annotations,
            dictionaries,
            output,
        } => commands::compile::run(annotations, dictionaries, output),

        Commands::AddDescription { file } => commands::describe::run(file),

        Commands::DatasetName { dataset } => commands::dataset_name::run(dataset),

        Commands::Assessments { file, output } => commands::assessments::run(file, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
