use crate::constants::{DEFAULT_BUCKET, DEFAULT_OBJECT};
use crate::error::{FeedError, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL of the object storage API. Env vars override this.
    pub base_url: Option<String>,
    pub bucket: String,
    pub object: String,
    /// Local file to read instead of object storage, mostly for dev runs.
    pub file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bucket: DEFAULT_BUCKET.to_string(),
            object: DEFAULT_OBJECT.to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory. A missing file is not
    /// an error so containerized deploys can run on env vars alone.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(FeedError::Config(format!(
                    "Failed to read config file '{}': {}",
                    config_path, e
                )))
            }
        };

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.bucket, "ddjobs");
        assert_eq!(config.storage.object, "currentjobs.json");
        assert!(config.storage.base_url.is_none());
        assert!(config.storage.file.is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let text = r#"
            [server]
            port = 9090

            [storage]
            base_url = "https://example.supabase.co"
            bucket = "jobs"
            object = "listings.json"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.base_url.as_deref(), Some("https://example.supabase.co"));
        assert_eq!(config.storage.bucket, "jobs");
        assert_eq!(config.storage.object, "listings.json");
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(toml::from_str::<Config>("server = ").is_err());
    }
}
