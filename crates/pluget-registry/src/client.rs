use std::sync::Arc;

use pluget_fetch::core::join_url;
use pluget_fetch::{FetchError, HttpClient, Transport};
use pluget_platform::SystemInfo;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::{RegistryError, Result};
use crate::models::{Plugin, PluginRepo};

/// Reads plugin metadata from a registry.
pub struct RegistryClient<C: HttpClient> {
    transport: Arc<Transport<C>>,
    system:    SystemInfo,
}

impl<C: HttpClient> RegistryClient<C> {
    pub fn new(transport: Arc<Transport<C>>, system: SystemInfo) -> Self { Self { transport, system } }

    pub fn system(&self) -> &SystemInfo { &self.system }

    /// Fetch `{registry_url}/repo/{plugin_id}`.
    pub async fn get_plugin(&self, plugin_id: &str, registry_url: &str) -> Result<Plugin> {
        debug!(plugin_id, registry_url, "getting plugin metadata");
        let body = self
            .transport
            .send_bytes(registry_url, &["repo", plugin_id])
            .await
            .map_err(|err| match err {
                FetchError::NotFound { .. } => RegistryError::PluginNotFound {
                    plugin_id: plugin_id.to_string(),
                    source:    err,
                },
                err => self.request_error(err),
            })?;

        decode(&body, "plugin metadata")
    }

    /// Fetch the full catalog from `{registry_url}/repo`.
    pub async fn list_all_plugins(&self, registry_url: &str) -> Result<PluginRepo> {
        let body = self.transport.send_bytes(registry_url, &["repo"]).await.map_err(|err| {
            error!(registry_url, error = %err, "failed to send request");
            self.request_error(err)
        })?;

        decode(&body, "plugin repo")
    }

    fn request_error(&self, err: FetchError) -> RegistryError {
        match err {
            FetchError::BadRequest(rejected) => {
                RegistryError::Request(FetchError::BadRequest(rejected.with_system_info(self.system.to_string())))
            }
            err => RegistryError::Request(err),
        }
    }
}

/// Download location of a release archive: `{registry_url}/{plugin_id}/versions/{version}/download`.
pub fn archive_url(registry_url: &str, plugin_id: &str, version: &str) -> Result<String> {
    join_url(registry_url, &[plugin_id, "versions", version, "download"]).map_err(RegistryError::Request)
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &'static str) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| {
        error!(what, error = %source, "failed to unmarshal registry response");
        RegistryError::Decode { what, source }
    })
}
