//! `offboarding` binary: parses the CLI, sets up logging and runs one command.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use offboarding_tracker::{
    cli::{Cli, Commands},
    commands,
    config::Config,
    errors::AppResult,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command, Config::from_env()).await {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> AppResult<()> {
    tracing::debug!(?config, "configuration loaded");

    match command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
        Commands::Bot => commands::bot::execute(config).await,
        Commands::Seed => commands::seed::execute(config).await,
        Commands::DriveAuth(args) => commands::drive_auth::execute(args, config).await,
    }
}

/// `--verbose` forces debug; otherwise `RUST_LOG`, defaulting to info.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
