//! Reading `plugin.json` out of downloaded archives.

use std::fs::File;
use std::path::Path;

use pluget_registry::InstalledPlugin;

use crate::error::ManifestError;

pub const MANIFEST_FILE: &str = "plugin.json";

/// Source of a downloaded plugin's own manifest.
pub trait ManifestReader: Send + Sync + 'static {
    fn read_manifest(&self, archive: &Path) -> Result<InstalledPlugin, ManifestError>;
}

/// Reads the shallowest `plugin.json` inside a zip archive.
///
/// Registry archives wrap the plugin in a top-level directory, so the
/// manifest is usually `<plugin-id>/plugin.json`. Nested bundled plugins have
/// their own deeper manifests, which are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipManifestReader;

impl ManifestReader for ZipManifestReader {
    fn read_manifest(&self, archive: &Path) -> Result<InstalledPlugin, ManifestError> {
        let file = File::open(archive).map_err(ManifestError::Open)?;
        let mut zip = zip::ZipArchive::new(file)?;

        let mut best: Option<(usize, usize)> = None;
        for index in 0..zip.len() {
            let entry = zip.by_index(index)?;
            let name = entry.name();
            let file_name = name.rsplit('/').next().unwrap_or(name);
            if entry.is_dir() || file_name != MANIFEST_FILE || name.starts_with("__MACOSX/") {
                continue;
            }
            let depth = name.matches('/').count();
            if best.is_none_or(|(best_depth, _)| depth < best_depth) {
                best = Some((depth, index));
            }
        }

        let (_, index) = best.ok_or(ManifestError::Missing)?;
        let entry = zip.by_index(index)?;
        Ok(serde_json::from_reader(entry)?)
    }
}

/// Whether `host_version` satisfies a manifest's host requirement.
///
/// Returns `None` when either side is not valid semver, so callers can skip
/// the check instead of rejecting the plugin.
pub fn host_version_compatible(requirement: &str, host_version: &str) -> Option<bool> {
    let requirement = requirement.trim();
    if requirement.is_empty() || requirement == "*" {
        return Some(true);
    }

    let requirement = semver::VersionReq::parse(requirement).ok()?;
    let host = semver::Version::parse(host_version.trim_start_matches('v')).ok()?;
    Some(requirement.matches(&host))
}
