//! jdkmatrix - JDK compatibility matrix runner
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use jdkmatrix::cli::{commands, Cli, Commands};
use jdkmatrix::config::ConfigManager;
use jdkmatrix::error::MatrixResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> MatrixResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("jdkmatrix=warn"),
        1 => EnvFilter::new("jdkmatrix=info"),
        _ => EnvFilter::new("jdkmatrix=debug"),
    };
    let json = matches!(&config, Ok(config) if config.general.log_format == "json");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = config?;

    // Dispatch to command
    match cli.command {
        Commands::Run(args) => commands::run(args, &config).await,
        Commands::Classify(args) => commands::classify(args, &config).await,
        Commands::Join(args) => commands::join(args).await,
        Commands::Inspect(args) => commands::inspect(args).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}
