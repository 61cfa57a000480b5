//! Resolver configuration, loadable from TOML.
//!
//! ```toml
//! registry_url = "https://grafana.com/api/plugins"
//! host_version = "9.1.0"
//! download_dir = "/var/lib/grafana/plugin-downloads"
//! metadata_timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use pluget_fetch::DownloadOptions;
use pluget_fetch::data::DEFAULT_SECURITY_CONTACT;
use pluget_platform::SystemInfo;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_REGISTRY_URL: &str = "https://grafana.com/api/plugins";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub registry_url:          String,
    /// Prefix of the identifying request headers and of the user agent.
    pub host_name:             String,
    pub host_version:          String,
    pub download_dir:          PathBuf,
    /// Timeout for registry metadata requests; `0` disables it. Archive
    /// downloads never time out.
    pub metadata_timeout_secs: u64,
    pub max_retries:           u32,
    pub security_contact:      String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url:          DEFAULT_REGISTRY_URL.to_string(),
            host_name:             "grafana".to_string(),
            host_version:          "dev".to_string(),
            download_dir:          std::env::temp_dir().join("pluget"),
            metadata_timeout_secs: 10,
            max_retries:           DownloadOptions::default().max_retries,
            security_contact:      DEFAULT_SECURITY_CONTACT.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(s)?) }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn metadata_timeout(&self) -> Option<Duration> {
        (self.metadata_timeout_secs > 0).then(|| Duration::from_secs(self.metadata_timeout_secs))
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions::default()
            .max_retries(self.max_retries)
            .security_contact(&self.security_contact)
    }

    /// The running host, as this config describes it.
    pub fn system_info(&self) -> Result<SystemInfo, ConfigError> {
        Ok(SystemInfo::detect(&self.host_name, &self.host_version)?)
    }
}
