//! vaultmirror settings, stored as one YAML file.
//!
//! The `connection` section is a flat key-value blob using the historical
//! setting names (`POSTGRES_HOST`, `S3_URL`, ...). Ports and the TLS flag are
//! stored as strings and interpreted through typed accessors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for vaultmirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: Settings,
    pub vault: VaultConfig,
    pub logging: LoggingConfig,
}

/// Connection parameters for the relational store and the object store.
///
/// Loaded once at startup and immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    pub postgres_host: String,
    pub postgres_port: String,
    pub postgres_database: String,
    pub postgres_username: String,
    pub postgres_password: String,
    /// Object store endpoint host, without scheme or port.
    pub s3_url: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub s3_port: String,
    pub s3_bucket: String,
    /// `"true"` or `"false"`.
    pub s3_ssl: String,
    /// Signing region; S3-compatible servers such as MinIO accept any value.
    pub s3_region: String,
}

/// Vault settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Root directory of the vault being mirrored.
    pub root: PathBuf,
    /// Name of the folder whose files are uploaded verbatim as images.
    pub image_folder: String,
    /// Milliseconds to wait after a filesystem event before dispatching the batch.
    pub debounce_ms: u64,
}

/// `tracing` filter applied when `RUST_LOG` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load() / save()
// ---------------------------------------------------------------------------

impl Config {
    /// Reads and parses the YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`Config::load`], with defaults for a missing or broken file.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Persist the configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/vaultmirror/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("vaultmirror")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Settings {
    fn default() -> Self {
        Self {
            postgres_host: String::new(),
            postgres_port: "5432".to_string(),
            postgres_database: String::new(),
            postgres_username: String::new(),
            postgres_password: String::new(),
            s3_url: String::new(),
            s3_access_key: String::new(),
            s3_secret_key: String::new(),
            s3_port: "9000".to_string(),
            s3_bucket: String::new(),
            s3_ssl: "true".to_string(),
            s3_region: "us-east-1".to_string(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("vault"),
            image_folder: "images".to_string(),
            debounce_ms: 300,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed accessors
// ---------------------------------------------------------------------------

fn parse_port(field: &str, value: &str) -> Result<u16, DomainError> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| DomainError::InvalidSetting {
            field: field.to_string(),
            message: format!("'{value}' is not a valid port number"),
        })
}

impl Settings {
    pub fn postgres_port(&self) -> Result<u16, DomainError> {
        parse_port("POSTGRES_PORT", &self.postgres_port)
    }

    pub fn s3_port(&self) -> Result<u16, DomainError> {
        parse_port("S3_PORT", &self.s3_port)
    }

    /// Whether the object store is reached over TLS
    pub fn s3_use_ssl(&self) -> bool {
        self.s3_ssl.trim().eq_ignore_ascii_case("true")
    }

    /// Endpoint URL of the object store API, e.g. `https://minio.local:9000`
    pub fn s3_endpoint(&self) -> Result<String, DomainError> {
        let scheme = if self.s3_use_ssl() { "https" } else { "http" };
        Ok(format!("{scheme}://{}:{}", self.s3_url, self.s3_port()?))
    }

    /// Public URL prefix of the bucket, ending with `/`
    pub fn s3_base_url(&self) -> Result<String, DomainError> {
        Ok(format!("{}/{}/", self.s3_endpoint()?, self.s3_bucket))
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// One problem found by [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"connection.S3_PORT"`.
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Every problem that would stop a session from starting; empty when usable.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let conn = &self.connection;

        // --- connection ---
        let required = [
            ("POSTGRES_HOST", &conn.postgres_host),
            ("POSTGRES_DATABASE", &conn.postgres_database),
            ("POSTGRES_USERNAME", &conn.postgres_username),
            ("S3_URL", &conn.s3_url),
            ("S3_ACCESS_KEY", &conn.s3_access_key),
            ("S3_SECRET_KEY", &conn.s3_secret_key),
            ("S3_BUCKET", &conn.s3_bucket),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("connection.{key}"),
                    message: "must not be empty".into(),
                });
            }
        }

        for result in [conn.postgres_port(), conn.s3_port()] {
            if let Err(DomainError::InvalidSetting { field, message }) = result {
                errors.push(ValidationError {
                    field: format!("connection.{field}"),
                    message,
                });
            }
        }

        if !["true", "false"].contains(&conn.s3_ssl.trim().to_ascii_lowercase().as_str()) {
            errors.push(ValidationError {
                field: "connection.S3_SSL".into(),
                message: format!("invalid flag '{}'; expected \"true\" or \"false\"", conn.s3_ssl),
            });
        }

        // --- vault ---
        let root_str = self.vault.root.to_string_lossy();
        if !root_str.starts_with('~') && !self.vault.root.is_dir() {
            errors.push(ValidationError {
                field: "vault.root".into(),
                message: format!("directory does not exist: {}", self.vault.root.display()),
            });
        }
        if self.vault.image_folder.is_empty() || self.vault.image_folder.contains('/') {
            errors.push(ValidationError {
                field: "vault.image_folder".into(),
                message: "must be a single folder name".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}
