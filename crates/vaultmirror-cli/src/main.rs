//! vaultmirror CLI - Mirror a notes vault into PostgreSQL and S3
//!
//! Provides commands for:
//! - Watching the vault and applying every change to both stores
//! - Pushing all images or the whole vault in one pass
//! - Viewing, creating and validating the configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    config::ConfigCommand,
    push::{PushImagesCommand, PushMarkdownCommand},
    watch::WatchCommand,
    GlobalOptions,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "vaultmirror",
    version,
    about = "Mirror a notes vault into a node table and an object store"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Watch the vault and mirror every change
    Watch(WatchCommand),
    /// Upload every file of the image folder
    PushImages(PushImagesCommand),
    /// Mirror the whole vault
    PushMarkdown(PushMarkdownCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Picks the tracing filter: `-v` flags override the configured level
fn log_filter(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.global.load_config()?;

    let filter = log_filter(cli.global.verbose, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.global.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Watch(cmd) => cmd.execute(&cli.global, config, format).await,
        Commands::PushImages(cmd) => cmd.execute(&cli.global, config, format).await,
        Commands::PushMarkdown(cmd) => cmd.execute(&cli.global, config, format).await,
        Commands::Config(cmd) => cmd.execute(&cli.global, &config, format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0, "warn"), "warn");
        assert_eq!(log_filter(1, "warn"), "debug");
        assert_eq!(log_filter(3, "warn"), "trace");
    }

    #[test]
    fn test_parse_watch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "vaultmirror",
            "watch",
            "--initial-push",
            "--vault",
            "/srv/vault",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.vault, Some(PathBuf::from("/srv/vault")));
        match cli.command {
            Commands::Watch(cmd) => assert!(cmd.initial_push),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_push_commands() {
        let cli = Cli::try_parse_from(["vaultmirror", "--json", "push-images"]).unwrap();
        assert!(cli.global.json);
        assert!(matches!(cli.command, Commands::PushImages(_)));

        let cli = Cli::try_parse_from([
            "vaultmirror",
            "push-markdown",
            "--local-db",
            "/tmp/nodes.db",
        ])
        .unwrap();
        assert_eq!(cli.global.local_db, Some(PathBuf::from("/tmp/nodes.db")));
        assert!(matches!(cli.command, Commands::PushMarkdown(_)));
    }

    #[test]
    fn test_parse_config_init_force() {
        let cli = Cli::try_parse_from(["vaultmirror", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::Init { force: true })
        ));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["vaultmirror", "sync"]).is_err());
    }
}
