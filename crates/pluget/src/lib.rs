//! Plugin acquisition: resolve a plugin ID to verified archives for it and
//! everything it depends on.
//!
//! ```no_run
//! use pluget::{Config, PluginDownloadOptions, Resolver};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("pluget.toml")?;
//! let resolver = Resolver::from_config(&config)?;
//!
//! let info = resolver
//!     .resolve("grafana-clock-panel", &PluginDownloadOptions::default(), &CancellationToken::new())
//!     .await?;
//! for node in info.install_order() {
//!     println!("{} v{} -> {}", node.id, node.version, node.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manifest;

mod error;
mod resolver;

pub use config::Config;
pub use error::{ConfigError, ManifestError, ResolveError, Result};
pub use manifest::{ManifestReader, ZipManifestReader};
pub use pluget_registry::{
    InstalledPlugin, PermissionDenied, Plugin, PluginArchiveInfo, PluginDownloadOptions, PluginRepo,
    RegistryClient, SelectError, VersionNotFound, VersionUnsupported,
};
pub use resolver::Resolver;
