use pluget_platform::SystemInfo;
use tracing::debug;

use crate::error::{SelectError, VersionNotFound, VersionUnsupported};
use crate::models::{Plugin, Version};

/// Choose the release to install.
///
/// With an explicit `requested` version the release must match exactly and
/// support the host. Without one, the first supported release in registry
/// order wins; the registry lists newest first and its order is not
/// re-sorted here.
pub fn select_version<'a>(
    plugin: &'a Plugin,
    requested: Option<&str>,
    system: &SystemInfo,
) -> Result<&'a Version, SelectError> {
    let requested = requested.map(str::trim).filter(|v| !v.is_empty());

    let Some(requested) = requested else {
        return match plugin.versions.iter().find(|v| v.supports(system)) {
            Some(latest) => {
                debug!(plugin_id = %plugin.id, version = %latest.version, "selected latest compatible release");
                Ok(latest)
            }
            None => Err(VersionUnsupported {
                plugin_id:         plugin.id.clone(),
                requested_version: "latest".to_string(),
                system_info:       system.to_string(),
            }
            .into()),
        };
    };

    let Some(release) = plugin.versions.iter().find(|v| v.version == requested) else {
        return Err(VersionNotFound {
            plugin_id:         plugin.id.clone(),
            requested_version: requested.to_string(),
            system_info:       system.to_string(),
        }
        .into());
    };

    if !release.supports(system) {
        return Err(VersionUnsupported {
            plugin_id:         plugin.id.clone(),
            requested_version: requested.to_string(),
            system_info:       system.to_string(),
        }
        .into());
    }

    Ok(release)
}
