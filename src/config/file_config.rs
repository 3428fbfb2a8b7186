use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML configuration. Every value present here wins over the CLI.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub media_path: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub token_secret: Option<String>,
    pub token_ttl_days: Option<u64>,
    pub max_upload_mb: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let config: FileConfig = toml::from_str(
            r#"
            port = 8080
            token_secret = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.token_secret.as_deref(), Some("abc"));
        assert!(config.db_dir.is_none());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(toml::from_str::<FileConfig>("port = \"high\"").is_err());
    }
}
