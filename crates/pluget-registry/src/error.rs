use std::fmt;
use std::path::PathBuf;

use pluget_fetch::FetchError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to find requested plugin, check if the plugin ID is correct: {plugin_id}")]
    PluginNotFound {
        plugin_id: String,
        #[source]
        source:    FetchError,
    },

    #[error("failed to send request: {0}")]
    Request(#[source] FetchError),

    #[error("failed to decode {what}: {source}")]
    Decode {
        what:   &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// No release could be chosen for the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error(transparent)]
    NotFound(#[from] VersionNotFound),

    #[error(transparent)]
    Unsupported(#[from] VersionUnsupported),
}

/// The requested version exists but has no build for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionUnsupported {
    pub plugin_id:         String,
    pub requested_version: String,
    pub system_info:       String,
}

impl fmt::Display for VersionUnsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} is not supported on your system ({})",
            self.plugin_id, self.requested_version, self.system_info
        )
    }
}

impl std::error::Error for VersionUnsupported {}

/// The requested version is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionNotFound {
    pub plugin_id:         String,
    pub requested_version: String,
    pub system_info:       String,
}

impl fmt::Display for VersionNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} either does not exist or is not supported on your system ({})",
            self.plugin_id, self.requested_version, self.system_info
        )
    }
}

impl std::error::Error for VersionNotFound {}

/// The archive destination could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDenied {
    pub path: PathBuf,
}

impl fmt::Display for PermissionDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not create {:?}, permission denied, make sure you have write access to plugin dir",
            self.path
        )
    }
}

impl std::error::Error for PermissionDenied {}
