//! Data layer: immutable request configuration and download results.

use pluget_platform::SystemInfo;

/// Default contact named when an archive fails verification.
pub const DEFAULT_SECURITY_CONTACT: &str = "security@grafana.com";

/// Headers identifying the host on every registry request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostHeaders {
    pub host_name: String,
    pub version:   String,
    pub os:        String,
    pub arch:      String,
}

impl HostHeaders {
    /// Header pairs: `{host}-version`, `{host}-os`, `{host}-arch` and `User-Agent`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let host = &self.host_name;
        vec![
            (format!("{host}-version"), self.version.clone()),
            (format!("{host}-os"), self.os.clone()),
            (format!("{host}-arch"), self.arch.clone()),
            ("User-Agent".to_string(), format!("{host} {}", self.version)),
        ]
    }
}

impl From<&SystemInfo> for HostHeaders {
    fn from(system: &SystemInfo) -> Self {
        Self {
            host_name: system.host_name().to_string(),
            version:   system.host_version().to_string(),
            os:        system.os().to_string(),
            arch:      system.arch().to_string(),
        }
    }
}

/// Archive download policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Retries after the first attempt when the response stream is malformed.
    ///
    /// Default: 2
    pub max_retries: u32,

    /// Who to contact when a checksum does not match.
    pub security_contact: String,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_retries:      2,
            security_contact: DEFAULT_SECURITY_CONTACT.to_string(),
        }
    }
}

impl DownloadOptions {
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn security_contact(mut self, contact: impl Into<String>) -> Self {
        self.security_contact = contact.into();
        self
    }
}

/// Outcome of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub bytes:    u64,
    /// Lowercase hex digest of the streamed bytes; `None` for local copies.
    pub checksum: Option<String>,
    pub attempts: u32,
}
