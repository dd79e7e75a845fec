//! Config command - View and manage vaultmirror configuration
//!
//! Provides the `vaultmirror config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON), secrets masked
//! 2. Writes a default configuration file
//! 3. Validates the configuration and reports errors

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::info;

use vaultmirror_core::config::Config;

use super::GlobalOptions;
use crate::output::{reporter, OutputFormat, Report};

const MASK: &str = "********";

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the configuration
    Validate,
}

impl ConfigCommand {
    pub async fn execute(
        &self,
        global: &GlobalOptions,
        config: &Config,
        format: OutputFormat,
    ) -> Result<()> {
        let path = global.config_path();
        match self {
            ConfigCommand::Show => show(config, &path, format),
            ConfigCommand::Init { force } => init(&path, *force, format),
            ConfigCommand::Validate => validate(config, &path, format),
        }
    }
}

/// Copy of `config` safe to print
fn masked(config: &Config) -> Config {
    let mut shown = config.clone();
    for secret in [
        &mut shown.connection.postgres_password,
        &mut shown.connection.s3_secret_key,
    ] {
        if !secret.is_empty() {
            *secret = MASK.to_string();
        }
    }
    shown
}

fn show(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    let report = reporter(format);
    let shown = masked(config);

    info!(config_path = %path.display(), "Showing configuration");

    if matches!(format, OutputFormat::Json) {
        let json =
            serde_json::to_value(&shown).context("Failed to serialize configuration to JSON")?;
        report.document(&json);
    } else {
        report.done(&format!("Configuration ({})", path.display()));
        report.detail("");

        let yaml =
            serde_yaml::to_string(&shown).context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            report.detail(line);
        }
    }
    Ok(())
}

fn init(path: &Path, force: bool, format: OutputFormat) -> Result<()> {
    let report = reporter(format);

    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(config_path = %path.display(), "Default configuration written");
    if matches!(format, OutputFormat::Json) {
        report.document(&serde_json::json!({
            "success": true,
            "config_path": path.display().to_string(),
        }));
    } else {
        report.done(&format!("Wrote {}", path.display()));
        report.detail("Fill in the connection section before running other commands");
    }
    Ok(())
}

fn validate(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    let report = reporter(format);
    let errors = config.validate();

    if matches!(format, OutputFormat::Json) {
        let list: Vec<_> = errors
            .iter()
            .map(|e| serde_json::json!({"field": e.field, "message": e.message}))
            .collect();
        report.document(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": path.display().to_string(),
            "errors": list,
        }));
    } else if errors.is_empty() {
        report.done(&format!("Configuration is valid ({})", path.display()));
    } else {
        for e in &errors {
            report.failure(&e.to_string());
        }
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_secrets_only_when_set() {
        let mut config = Config::default();
        config.connection.postgres_password = "hunter2".to_string();
        config.connection.s3_access_key = "minio".to_string();

        let shown = masked(&config);
        assert_eq!(shown.connection.postgres_password, MASK);
        assert_eq!(shown.connection.s3_secret_key, "");
        assert_eq!(shown.connection.s3_access_key, "minio");
    }

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        init(&path, false, OutputFormat::Json).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.connection.s3_port, "9000");
        assert_eq!(loaded.vault.debounce_ms, 300);
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logging:\n  level: debug\n").unwrap();

        assert!(init(&path, false, OutputFormat::Json).is_err());
        assert_eq!(Config::load(&path).unwrap().logging.level, "debug");

        init(&path, true, OutputFormat::Json).unwrap();
        assert_eq!(Config::load(&path).unwrap().logging.level, "info");
    }

    #[test]
    fn test_validate_fails_on_empty_connection() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.vault.root = dir.path().to_path_buf();

        assert!(validate(&config, Path::new("config.yaml"), OutputFormat::Json).is_err());
    }
}
