// file: src/main.rs
// version: 1.0.0
// guid: b19d6f43-2a8e-4c70-85f1-9e4c02a7d3b6

//! AWS Cluster Agent - Main entry point

use aws_cluster_agent::{
    cli::{commands::*, Cli, Commands},
    logging::logger,
};
use clap::Parser;
use tokio::signal;
use tracing::{error, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_logger(cli.verbose, cli.quiet) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let command_future = async {
        match cli.command {
            Commands::Create => create_command(&cli.config).await,
            Commands::Install => install_command(&cli.config).await,
            Commands::Destroy => destroy_command(&cli.config).await,
            Commands::CheckPrereqs => check_prerequisites_command().await,
        }
    };

    // Children share the process group and receive the interrupt themselves.
    let result = match run_interruptible(command_future, signal::ctrl_c()).await {
        Completion::Finished(result) => result,
        Completion::Interrupted => {
            warn!("Application interrupted by user");
            std::process::exit(130);
        }
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
