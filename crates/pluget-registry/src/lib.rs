//! Plugin registry client, catalog data model and release selection.
//!
//! - [`models`] - Registry documents, plugin manifests and the resolved archive tree
//! - [`RegistryClient`] - Catalog and single-plugin lookups over a [`pluget_fetch::Transport`]
//! - [`select_version`] - Picks the release that fits the host

pub mod models;

mod client;
mod error;
mod select;

pub use client::{RegistryClient, archive_url};
pub use error::{PermissionDenied, RegistryError, Result, SelectError, VersionNotFound, VersionUnsupported};
pub use models::{
    ArchMeta, Dependencies, InstalledPlugin, Plugin, PluginArchiveInfo, PluginDependency, PluginDownloadOptions,
    PluginInfo, PluginRepo, Version,
};
pub use select::select_version;
