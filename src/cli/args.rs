//! `offboarding` subcommands and their flags.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

/// Offboarding Tracker: case screens, Drive uploads and a Telegram bot
#[derive(Parser, Debug)]
#[command(name = "offboarding")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the web app (applies pending migrations first)
    Serve(ServeArgs),

    /// Manage the schema by hand
    Migrate(MigrateArgs),

    /// Run the Telegram command bot (long polling)
    Bot,

    /// Create the development accounts
    Seed,

    /// Authorize Drive uploads with an OAuth client and write the token file
    DriveAuth(DriveAuthArgs),
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Bind address, overriding SERVER_HOST
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port, overriding SERVER_PORT
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Flags win over the configured SERVER_HOST / SERVER_PORT.
    pub fn bind_addr(&self, config: &Config) -> String {
        match (&self.host, self.port) {
            (None, None) => config.server_addr(),
            (host, port) => format!(
                "{}:{}",
                host.as_deref().unwrap_or(&config.server_host),
                port.unwrap_or(config.server_port)
            ),
        }
    }
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Apply pending migrations
    Up,
    /// Undo the most recent migration
    Down,
    /// List migrations as applied or pending
    Status,
    /// Drop all tables and replay every migration
    Fresh,
}

#[derive(Parser, Debug)]
pub struct DriveAuthArgs {
    /// OAuth client secret downloaded from the cloud console
    #[arg(long, default_value = "client_secret.json")]
    pub client_secret: PathBuf,

    /// Where to write the authorized-user token (defaults to GOOGLE_OAUTH_TOKEN_FILE)
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// Loopback port for the redirect (0 picks a free port)
    #[arg(long, default_value = "0")]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["offboarding", "migrate", "status"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Status
            })
        ));

        let cli = Cli::try_parse_from(["offboarding", "-v", "bot"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Bot));

        let cli = Cli::try_parse_from(["offboarding", "drive-auth", "--port", "8765"]).unwrap();
        match cli.command {
            Commands::DriveAuth(args) => {
                assert_eq!(args.port, 8765);
                assert_eq!(args.client_secret, PathBuf::from("client_secret.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_serve_binds_config_unless_flags_override() {
        let config = Config::from_lookup(|key| match key {
            "SERVER_HOST" => Some("127.0.0.1".to_string()),
            "SERVER_PORT" => Some("9000".to_string()),
            _ => None,
        });

        fn serve(argv: &[&str]) -> ServeArgs {
            match Cli::try_parse_from(argv).unwrap().command {
                Commands::Serve(args) => args,
                other => panic!("unexpected command: {:?}", other),
            }
        }

        assert_eq!(serve(&["offboarding", "serve"]).bind_addr(&config), "127.0.0.1:9000");
        assert_eq!(
            serve(&["offboarding", "serve", "--port", "8080"]).bind_addr(&config),
            "127.0.0.1:8080"
        );
        assert_eq!(
            serve(&["offboarding", "serve", "-H", "0.0.0.0"]).bind_addr(&config),
            "0.0.0.0:9000"
        );

        let defaults = Config::from_lookup(|_| None);
        assert_eq!(serve(&["offboarding", "serve"]).bind_addr(&defaults), "0.0.0.0:8501");
    }
}
