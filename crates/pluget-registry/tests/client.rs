//! Registry client tests against an in-memory registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use pluget_fetch::{FetchError, HostHeaders, HttpClient, HttpResponse, Result, StreamError, Transport};
use pluget_platform::SystemInfo;
use pluget_platform::arch::Arch;
use pluget_platform::os::Os;
use pluget_registry::{RegistryClient, RegistryError};

const BASE: &str = "https://registry.test/api/plugins";

/// Canned responses keyed by URL; anything else is a 404.
#[derive(Default)]
struct FakeRegistry {
    routes: HashMap<String, (u16, &'static str)>,
    seen:   Mutex<Vec<String>>,
}

impl FakeRegistry {
    fn route(mut self, path: &str, status: u16, body: &'static str) -> Self {
        self.routes.insert(format!("{BASE}{path}"), (status, body));
        self
    }
}

#[derive(Clone)]
struct Shared(Arc<FakeRegistry>);

impl HttpClient for Shared {
    async fn get(&self, url: &str, _headers: &[(String, String)]) -> Result<HttpResponse> {
        self.0.seen.lock().unwrap().push(url.to_string());
        let (status, body) = self.0.routes.get(url).copied().unwrap_or((404, ""));
        let chunks = vec![Ok::<_, StreamError>(Bytes::from_static(body.as_bytes()))];
        Ok(HttpResponse::new(status, format!("{status}"), Box::pin(futures_util::stream::iter(chunks))))
    }
}

fn client(registry: FakeRegistry) -> (Shared, RegistryClient<Shared>) {
    let shared = Shared(Arc::new(registry));
    let system = SystemInfo::new("grafana", "9.1.0", Os::Linux, Arch::Amd64);
    let transport = Arc::new(Transport::new(shared.clone(), shared.clone(), &HostHeaders::from(&system)));
    (shared, RegistryClient::new(transport, system))
}

#[tokio::test]
async fn get_plugin_decodes_entry() {
    let (shared, client) = client(FakeRegistry::default().route(
        "/repo/clock",
        200,
        r#"{"id":"clock","category":"panel","versions":[{"version":"1.0","arch":{"any":{"sha256":""}}}]}"#,
    ));

    let plugin = client.get_plugin("clock", BASE).await.unwrap();

    assert_eq!(plugin.id, "clock");
    assert_eq!(plugin.versions[0].version, "1.0");
    assert_eq!(*shared.0.seen.lock().unwrap(), [format!("{BASE}/repo/clock")]);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (_, client) = client(FakeRegistry::default());

    for id in ["nope", "grafana-missing-panel", "x"] {
        match client.get_plugin(id, BASE).await {
            Err(RegistryError::PluginNotFound { plugin_id, source }) => {
                assert_eq!(plugin_id, id);
                assert!(source.is_not_found());
            }
            other => panic!("expected not found for {id}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn rejected_requests_carry_message_and_system_info() {
    let (_, client) =
        client(FakeRegistry::default().route("/repo/clock", 400, r#"{"message":"Plugin is deprecated"}"#));

    match client.get_plugin("clock", BASE).await {
        Err(RegistryError::Request(FetchError::BadRequest(err))) => {
            assert_eq!(err.message.as_deref(), Some("Plugin is deprecated"));
            assert_eq!(err.system_info.as_deref(), Some("grafana v9.1.0 linux-amd64"));
            assert_eq!(err.to_string(), "Plugin is deprecated (grafana v9.1.0 linux-amd64)");
        }
        other => panic!("expected bad request, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_request_failures() {
    let (_, client) = client(FakeRegistry::default().route("/repo", 502, "bad gateway"));

    let err = client.list_all_plugins(BASE).await.unwrap_err();
    assert!(matches!(err, RegistryError::Request(FetchError::UnexpectedStatus { .. })), "got {err:?}");
}

#[tokio::test]
async fn list_all_plugins_decodes_catalog() {
    let (_, client) = client(FakeRegistry::default().route(
        "/repo",
        200,
        r#"{"version":"1","plugins":[{"id":"a","versions":[]},{"id":"b","versions":[]}]}"#,
    ));

    let repo = client.list_all_plugins(BASE).await.unwrap();

    assert_eq!(repo.version, "1");
    assert_eq!(repo.plugins.len(), 2);
    assert!(repo.find("b").is_some());
}

#[tokio::test]
async fn malformed_catalog_is_a_decode_error() {
    let (_, client) = client(FakeRegistry::default().route("/repo", 200, "{not json"));

    let err = client.list_all_plugins(BASE).await.unwrap_err();
    assert!(matches!(err, RegistryError::Decode { what: "plugin repo", .. }));
}
