//! # Configuration Loader
//!
//! Builds an [`OutreachConfig`] from defaults, an optional TOML file and
//! `OUTREACH_`-prefixed environment variables, then validates it.

use ::config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::OutreachConfig;
use crate::error::OutreachResult;

const CONFIG_PATH_ENV: &str = "OUTREACH_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/outreach.toml";
const ENV_PREFIX: &str = "OUTREACH";
const ENV_SEPARATOR: &str = "__";

/// Loads and holds the validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: OutreachConfig,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration using the file named by `OUTREACH_CONFIG_PATH`
    pub fn load() -> OutreachResult<OutreachConfig> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Ok(Self::load_from(&path)?.config)
    }

    /// Load configuration from an explicit file path (missing file is allowed)
    pub fn load_from(path: &Path) -> OutreachResult<Self> {
        let file_present = path.exists();
        debug!(path = %path.display(), file_present, "Loading outreach configuration");

        let settings = Config::builder()
            .add_source(Config::try_from(&OutreachConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR),
            )
            .build()?;

        let config: OutreachConfig = settings.try_deserialize()?;
        config.validate()?;

        info!(
            bind_address = %config.web.bind_address,
            forwarding_configured = config.forwarding.webhook_url.is_some(),
            webhook_secret_configured = config.web.webhook_secret.is_some(),
            default_batch_size = config.dispatch.default_batch_size,
            "Outreach configuration loaded"
        );

        Ok(Self {
            config,
            source_path: file_present.then(|| path.to_path_buf()),
        })
    }

    pub fn config(&self) -> &OutreachConfig {
        &self.config
    }

    /// File the configuration was read from, if one existed
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn into_config(self) -> OutreachConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(manager.source_path().is_none());
        assert_eq!(manager.config().dispatch.default_batch_size, 10);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[dispatch]
default_batch_size = 25

[forwarding]
webhook_url = "https://hooks.example.test/outreach"
max_attempts = 3

[web]
webhook_secret = "s3cret"
"#
        )
        .unwrap();

        let manager = ConfigManager::load_from(file.path()).unwrap();
        let config = manager.config();
        assert_eq!(config.dispatch.default_batch_size, 25);
        assert_eq!(config.dispatch.max_batch_size, 500);
        assert_eq!(
            config.forwarding.webhook_url.as_deref(),
            Some("https://hooks.example.test/outreach")
        );
        assert_eq!(config.forwarding.max_attempts, 3);
        assert_eq!(config.web.webhook_secret.as_deref(), Some("s3cret"));
        assert!(manager.source_path().is_some());
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dispatch]\ndefault_batch_size = 0").unwrap();
        assert!(ConfigManager::load_from(file.path()).is_err());
    }
}
