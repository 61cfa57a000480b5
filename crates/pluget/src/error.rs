use std::io;
use std::path::PathBuf;

use pluget_fetch::FetchError;
use pluget_registry::{PermissionDenied, RegistryError, SelectError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("failed to download {plugin_id}: {source}")]
    Download {
        plugin_id: String,
        #[source]
        source:    FetchError,
    },

    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    #[error("failed to create {path:?}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read manifest of {plugin_id}: {source}")]
    Manifest {
        plugin_id: String,
        #[source]
        source:    ManifestError,
    },

    #[error("failed to resolve dependency {id} ({}): {source}", .version.as_deref().unwrap_or("latest"))]
    Dependency {
        id:      String,
        version: Option<String>,
        #[source]
        source:  Box<ResolveError>,
    },

    #[error("dependency cycle detected: {}", .chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },
}

impl ResolveError {
    /// The innermost error, skipping dependency annotations.
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::Dependency { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to open archive: {0}")]
    Open(#[source] io::Error),

    #[error("invalid plugin archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive does not contain a plugin.json")]
    Missing,

    #[error("failed to decode plugin.json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("manifest reader failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Platform(#[from] pluget_platform::Error),

    #[error("failed to set up HTTP clients: {0}")]
    Client(#[from] FetchError),
}
