use std::process;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;
use gman::cli::{Cli, Commands};
use gman::{commands, config, logging};
use tracing::error;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let guard = logging::init_logger();

    let args = Cli::parse();

    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return;
    };

    let config = match config::load_configuration(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            drop(guard);
            process::exit(1);
        }
    };

    let result = match command {
        Commands::Import => commands::import::run(&config).await,
        Commands::Append => commands::append::run(&config).await,
        Commands::Clean(clean_args) => commands::clean::run(&config, &clean_args).await,
        Commands::Groups(group_command) => commands::groups::run(&config, &group_command).await,
        Commands::PrintConfig => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        drop(guard);
        process::exit(1);
    }
}
