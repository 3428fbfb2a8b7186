mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use rand::{distr::Alphanumeric, Rng};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3910;
pub const DEFAULT_TOKEN_TTL_DAYS: u64 = 14;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const MAX_TOKEN_TTL_DAYS: u64 = 3650;
const GENERATED_SECRET_LENGTH: usize = 64;

/// CLI arguments that can be used for config resolution.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub media_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub token_secret: Option<String>,
    pub token_ttl_days: u64,
    pub max_upload_mb: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_dir: None,
            media_path: None,
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            token_secret: None,
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub media_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub token_secret: String,
    pub token_ttl: Duration,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let media_path = file
            .media_path
            .map(PathBuf::from)
            .or_else(|| cli.media_path.clone())
            .unwrap_or_else(|| db_dir.join("media"));

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let token_secret = match file.token_secret.or_else(|| cli.token_secret.clone()) {
            Some(secret) if secret.is_empty() => bail!("The token secret cannot be empty"),
            Some(secret) => secret,
            None => {
                warn!("No token secret configured, generated a random one. Tokens will not survive a restart.");
                generate_secret()
            }
        };

        let token_ttl_days = file.token_ttl_days.unwrap_or(cli.token_ttl_days);
        if token_ttl_days == 0 {
            bail!("token_ttl_days must be at least 1");
        }
        if token_ttl_days > MAX_TOKEN_TTL_DAYS {
            bail!("token_ttl_days must be at most {}", MAX_TOKEN_TTL_DAYS);
        }

        let max_upload_mb = file.max_upload_mb.unwrap_or(cli.max_upload_mb);
        let Some(max_upload_bytes) = max_upload_mb.checked_mul(1024 * 1024) else {
            bail!("max_upload_mb {} is too large", max_upload_mb);
        };

        Ok(Self {
            db_dir,
            media_path,
            port,
            logging_level,
            token_secret,
            token_ttl: Duration::from_secs(token_ttl_days * 24 * 60 * 60),
            max_upload_bytes,
        })
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.db_dir.join("catalog.db")
    }
}

fn generate_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LENGTH)
        .map(char::from)
        .collect()
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
