//! Registry documents, plugin manifests and the resolved archive tree.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use pluget_platform::{SystemInfo, WILDCARD_ARCH};
use serde::{Deserialize, Serialize};

/// A catalog entry: one plugin and its published releases, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plugin {
    pub id:       String,
    pub category: String,
    pub versions: Vec<Version>,
}

/// One published release of a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub commit:  String,
    #[serde(rename = "repoURL")]
    pub url:     String,
    pub version: String,
    /// Per-platform metadata keyed by `{os}-{arch}` or `any`.
    pub arch:    HashMap<String, ArchMeta>,
}

impl Version {
    /// Metadata for the host's exact platform, falling back to the wildcard.
    pub fn arch_meta(&self, system: &SystemInfo) -> Option<&ArchMeta> {
        let key = system.arch_key();
        self.arch
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
            .map(|(_, meta)| meta)
            .or_else(|| self.arch.get(WILDCARD_ARCH))
    }

    /// A release is installable only if it declares the host's platform or `any`.
    pub fn supports(&self, system: &SystemInfo) -> bool { self.arch_meta(system).is_some() }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchMeta {
    pub sha256: String,
}

/// The full registry catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginRepo {
    pub plugins: Vec<Plugin>,
    pub version: String,
}

impl PluginRepo {
    pub fn find(&self, plugin_id: &str) -> Option<&Plugin> { self.plugins.iter().find(|p| p.id == plugin_id) }
}

/// Caller overrides that bypass registry-driven release selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginDownloadOptions {
    pub version:        Option<String>,
    pub plugin_zip_url: Option<String>,
}

impl PluginDownloadOptions {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn plugin_zip_url(mut self, url: impl Into<String>) -> Self {
        self.plugin_zip_url = Some(url.into());
        self
    }
}

/// A resolved plugin: its verified archive and, recursively, its dependencies'.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginArchiveInfo {
    pub id:           String,
    pub version:      String,
    pub path:         PathBuf,
    /// Hex digest computed while downloading; `None` for local archives.
    pub checksum:     Option<String>,
    pub dependencies: BTreeMap<String, PluginArchiveInfo>,
}

impl PluginArchiveInfo {
    /// Every node of the tree, dependencies before their dependents.
    pub fn install_order(&self) -> Vec<&PluginArchiveInfo> {
        let mut order = Vec::new();
        self.collect_install_order(&mut order);
        order
    }

    fn collect_install_order<'a>(&'a self, order: &mut Vec<&'a PluginArchiveInfo>) {
        for dependency in self.dependencies.values() {
            dependency.collect_install_order(order);
        }
        order.push(self);
    }
}

/// The `plugin.json` manifest shipped inside a plugin archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledPlugin {
    pub id:           String,
    pub name:         String,
    #[serde(rename = "type")]
    pub plugin_type:  String,
    pub info:         PluginInfo,
    pub dependencies: Dependencies,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependencies {
    /// Minimum host version, as a version requirement such as `>=8.0.0`.
    #[serde(rename = "grafanaVersion", alias = "grafanaDependency")]
    pub grafana_version: String,
    pub plugins:         Vec<PluginDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginDependency {
    pub id:          String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub name:        String,
    pub version:     String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    pub version: String,
    pub updated: String,
}
