use tracing::{debug, warn};

use crate::core::{StatusClass, classify_status, client_error_message, join_url};
use crate::data::HostHeaders;
use crate::effects::http::{BodyStream, HttpClient, HttpResponse, collect_body};
use crate::error::{FetchError, Response4xxError, Result};

/// GET requests against the registry and archive hosts.
///
/// Metadata and archive requests go through separate clients so that catalog
/// lookups can be bounded by a timeout while large archives are not.
pub struct Transport<C: HttpClient> {
    metadata: C,
    archive:  C,
    headers:  Vec<(String, String)>,
}

impl<C: HttpClient> Transport<C> {
    pub fn new(metadata: C, archive: C, headers: &HostHeaders) -> Self {
        Self { metadata, archive, headers: headers.to_pairs() }
    }

    /// GET `{base}/{segments...}` with the metadata client.
    pub async fn send(&self, base: &str, segments: &[&str]) -> Result<BodyStream> {
        let url = join_url(base, segments)?;
        self.request(&self.metadata, &url).await
    }

    /// Like [`Transport::send`], collecting the whole body.
    pub async fn send_bytes(&self, base: &str, segments: &[&str]) -> Result<Vec<u8>> {
        let body = self.send(base, segments).await?;
        Ok(collect_body(body).await?)
    }

    /// GET an archive with the timeout-free client.
    pub async fn open_archive(&self, url: &str) -> Result<BodyStream> {
        let url = join_url(url, &[])?;
        self.request(&self.archive, &url).await
    }

    async fn request(&self, client: &C, url: &str) -> Result<BodyStream> {
        debug!(url, "sending request");
        let response = client.get(url, &self.headers).await?;
        handle_response(url, response).await
    }
}

async fn handle_response(url: &str, response: HttpResponse) -> Result<BodyStream> {
    let status = response.status;
    match classify_status(status) {
        StatusClass::Success => Ok(response.body),
        StatusClass::NotFound => Err(FetchError::NotFound { url: url.to_string() }),
        StatusClass::ClientError => {
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(url, status, error = %err, "failed to read response body");
                    Vec::new()
                }
            };
            Err(Response4xxError {
                message:     client_error_message(&body),
                status_code: status,
                system_info: None,
            }
            .into())
        }
        StatusClass::Unexpected => Err(FetchError::UnexpectedStatus { status_line: response.status_line }),
    }
}
