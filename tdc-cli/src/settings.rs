//! Layered CLI configuration.
//!
//! Precedence, lowest first: built-in defaults, `tdc.toml` (platform config
//! dir or `--config`), `TDC_*` environment variables, command-line flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tdc_client::config::DEFAULT_BASE_URL;
use tdc_client::ClientConfig;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub session_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: client.timeout_secs,
            poll_interval_secs: client.poll_interval_secs,
            session_file: None,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `file` must exist; the default one is optional.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("poll_interval_secs", defaults.poll_interval_secs)?;

        match file {
            Some(path) => {
                builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
            },
            None => {
                if let Some(path) = default_config_file() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            },
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("TDC"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(settings)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout_secs: self.timeout_secs,
            poll_interval_secs: self.poll_interval_secs,
            ..ClientConfig::default()
        }
        .with_base_url(self.api_url.clone())
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        match &self.session_file {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("session.json")),
        }
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tdc").join("tdc.toml"))
}

fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine data directory")?;
    Ok(base.join("tdc"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "api_url = \"http://127.0.0.1:8000/api/\"").unwrap();
        writeln!(file, "poll_interval_secs = 5").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.api_url, "http://127.0.0.1:8000/api/");
        assert_eq!(settings.poll_interval_secs, 5);
        assert_eq!(settings.timeout_secs, Settings::default().timeout_secs);

        let client = settings.client_config();
        assert_eq!(client.base_url, "http://127.0.0.1:8000/api/");
        assert_eq!(client.poll_interval_secs, 5);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_session_file_setting_wins() {
        let settings =
            Settings { session_file: Some(PathBuf::from("/tmp/s.json")), ..Settings::default() };
        assert_eq!(settings.session_path().unwrap(), PathBuf::from("/tmp/s.json"));
    }
}
