use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use pluget_fetch::{ArchiveDownloader, DownloadOptions, DownloadReport, HostHeaders, HttpClient, Transport};
use pluget_platform::SystemInfo;
use pluget_registry::{
    InstalledPlugin, PermissionDenied, PluginArchiveInfo, PluginDownloadOptions, RegistryClient, archive_url, select_version,
};
use tokio::fs::File;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ManifestError, ResolveError, Result};
use crate::manifest::{ManifestReader, ZipManifestReader, host_version_compatible};

/// Turns a plugin ID into verified archives for it and its dependencies.
pub struct Resolver<C: HttpClient, M: ManifestReader = ZipManifestReader> {
    registry:     RegistryClient<C>,
    downloader:   ArchiveDownloader<C>,
    manifests:    Arc<M>,
    registry_url: String,
    download_dir: PathBuf,
}

impl<C: HttpClient> Resolver<C> {
    pub fn new(
        transport: Arc<Transport<C>>,
        system: SystemInfo,
        registry_url: impl Into<String>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry:     RegistryClient::new(transport.clone(), system),
            downloader:   ArchiveDownloader::new(transport),
            manifests:    Arc::new(ZipManifestReader),
            registry_url: registry_url.into(),
            download_dir: download_dir.into(),
        }
    }

    /// Build a resolver from explicit clients.
    pub fn with_clients(
        metadata: C,
        archive: C,
        system: SystemInfo,
        registry_url: impl Into<String>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        let transport = Arc::new(Transport::new(metadata, archive, &HostHeaders::from(&system)));
        Self::new(transport, system, registry_url, download_dir)
    }
}

#[cfg(feature = "reqwest")]
impl Resolver<pluget_fetch::ReqwestClient> {
    /// Production resolver: a bounded-timeout metadata client and an
    /// unbounded archive client.
    pub fn from_config(config: &crate::Config) -> std::result::Result<Self, crate::ConfigError> {
        use pluget_fetch::ReqwestClient;

        let resolver = Self::with_clients(
            ReqwestClient::with_timeout(config.metadata_timeout())?,
            ReqwestClient::new()?,
            config.system_info()?,
            &config.registry_url,
            &config.download_dir,
        );
        Ok(resolver.with_download_options(config.download_options()))
    }
}

impl<C: HttpClient, M: ManifestReader> Resolver<C, M> {
    pub fn with_manifest_reader<N: ManifestReader>(self, manifests: N) -> Resolver<C, N> {
        Resolver {
            registry: self.registry,
            downloader: self.downloader,
            manifests: Arc::new(manifests),
            registry_url: self.registry_url,
            download_dir: self.download_dir,
        }
    }

    pub fn with_download_options(self, options: DownloadOptions) -> Self {
        Self { downloader: self.downloader.with_options(options), ..self }
    }

    pub fn registry(&self) -> &RegistryClient<C> { &self.registry }

    pub fn registry_url(&self) -> &str { &self.registry_url }

    /// Resolve `plugin_id` and, recursively, every plugin its manifest depends on.
    ///
    /// Each node's archive is written to the download directory and verified
    /// before its dependencies are looked at. A dependency that is already
    /// being resolved further up the tree fails with
    /// [`ResolveError::DependencyCycle`].
    pub async fn resolve(
        &self,
        plugin_id: &str,
        options: &PluginDownloadOptions,
        cancel: &CancellationToken,
    ) -> Result<PluginArchiveInfo> {
        let mut chain = Vec::new();
        self.resolve_node(plugin_id.to_string(), options.clone(), cancel, &mut chain).await
    }

    fn resolve_node<'a>(
        &'a self,
        plugin_id: String,
        options: PluginDownloadOptions,
        cancel: &'a CancellationToken,
        chain: &'a mut Vec<String>,
    ) -> BoxFuture<'a, Result<PluginArchiveInfo>> {
        Box::pin(async move {
            if chain.contains(&plugin_id) {
                let mut cycle = chain.clone();
                cycle.push(plugin_id);
                return Err(ResolveError::DependencyCycle { chain: cycle });
            }

            chain.push(plugin_id.clone());
            let result = self.resolve_one(&plugin_id, &options, cancel, chain).await;
            chain.pop();
            result
        })
    }

    async fn resolve_one(
        &self,
        plugin_id: &str,
        options: &PluginDownloadOptions,
        cancel: &CancellationToken,
        chain: &mut Vec<String>,
    ) -> Result<PluginArchiveInfo> {
        let system = self.registry.system();

        let (source, version, checksum) = match &options.plugin_zip_url {
            Some(url) => {
                debug!(plugin_id, url, "using explicit plugin archive");
                (url.clone(), options.version.clone(), String::new())
            }
            None => {
                let plugin = self.registry.get_plugin(plugin_id, &self.registry_url).await?;
                let release = select_version(&plugin, options.version.as_deref(), system)?;
                let checksum = release.arch_meta(system).map(|meta| meta.sha256.clone()).unwrap_or_default();
                let url = archive_url(&self.registry_url, plugin_id, &release.version)?;
                (url, Some(release.version.clone()), checksum)
            }
        };

        let path = self.archive_path(plugin_id, version.as_deref());
        info!(plugin_id, version = version.as_deref().unwrap_or("unknown"), "downloading plugin");
        let report = self.download_to(plugin_id, &path, &source, &checksum, cancel).await?;

        let manifest = self
            .read_manifest(&path)
            .await
            .map_err(|source| ResolveError::Manifest { plugin_id: plugin_id.to_string(), source })?;

        let required = &manifest.dependencies.grafana_version;
        if host_version_compatible(required, system.host_version()) == Some(false) {
            warn!(
                plugin_id,
                required = %required,
                host_version = system.host_version(),
                "plugin requires a different host version"
            );
        }

        let mut dependencies = BTreeMap::new();
        for dependency in &manifest.dependencies.plugins {
            let pinned = Some(dependency.version.trim()).filter(|v| !v.is_empty()).map(str::to_owned);
            let options = PluginDownloadOptions { version: pinned.clone(), plugin_zip_url: None };

            debug!(plugin_id, dependency = %dependency.id, "resolving dependency");
            let info = self
                .resolve_node(dependency.id.clone(), options, cancel, chain)
                .await
                .map_err(|source| ResolveError::Dependency {
                    id:      dependency.id.clone(),
                    version: pinned,
                    source:  Box::new(source),
                })?;
            dependencies.insert(dependency.id.clone(), info);
        }

        let version = version
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| manifest.info.version.clone());

        Ok(PluginArchiveInfo {
            id: plugin_id.to_string(),
            version,
            path,
            checksum: report.checksum,
            dependencies,
        })
    }

    fn archive_path(&self, plugin_id: &str, version: Option<&str>) -> PathBuf {
        let sanitize = |s: &str| s.replace(['/', '\\', ':'], "_");
        let name = match version {
            Some(version) if !version.is_empty() => format!("{}-{}.zip", sanitize(plugin_id), sanitize(version)),
            _ => format!("{}.zip", sanitize(plugin_id)),
        };
        self.download_dir.join(name)
    }

    async fn read_manifest(&self, archive: &Path) -> std::result::Result<InstalledPlugin, ManifestError> {
        let manifests = Arc::clone(&self.manifests);
        let archive = archive.to_path_buf();
        tokio::task::spawn_blocking(move || manifests.read_manifest(&archive)).await?
    }

    /// Download into a staging file next to `path` and move it into place once
    /// verified, so `path` itself may also be the local source.
    async fn download_to(
        &self,
        plugin_id: &str,
        path: &Path,
        source: &str,
        checksum: &str,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport> {
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|err| create_error(&self.download_dir, err))?;

        let staging = staging_path(path);
        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staging)
            .await
            .map_err(|err| create_error(&staging, err))?;

        let result = self.downloader.download(plugin_id, &mut file, source, checksum, cancel).await;
        drop(file);

        let placed = match result {
            Ok(report) => tokio::fs::rename(&staging, path)
                .await
                .map(|()| report)
                .map_err(|err| create_error(path, err)),
            Err(source) => Err(ResolveError::Download { plugin_id: plugin_id.to_string(), source }),
        };
        if placed.is_err() {
            discard(&staging).await;
        }
        placed
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

async fn discard(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "failed to remove unusable archive");
        }
    }
}

fn create_error(path: &Path, err: io::Error) -> ResolveError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        PermissionDenied { path: path.to_path_buf() }.into()
    } else {
        ResolveError::Io { path: path.to_path_buf(), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_are_distinguished() {
        let path = Path::new("/var/lib/grafana/plugins/clock-1.0.zip");

        let err = create_error(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ResolveError::PermissionDenied(PermissionDenied { path: ref p }) if p == path));

        let err = create_error(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ResolveError::Io { .. }));
    }

    #[test]
    fn staging_file_sits_next_to_the_archive() {
        let path = Path::new("/var/lib/grafana/plugins/clock-1.0.zip");
        assert_eq!(staging_path(path), Path::new("/var/lib/grafana/plugins/clock-1.0.zip.part"));
    }
}
