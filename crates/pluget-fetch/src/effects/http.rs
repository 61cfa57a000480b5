use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::error::{Result, StreamError};

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// A response body whose chunk errors are already classified.
pub type BodyStream = BoxStream<'static, std::result::Result<Bytes, StreamError>>;

/// Status and body of a GET request. Dropping the body closes the connection.
pub struct HttpResponse {
    pub status:      u16,
    /// Status line as reported by the server, e.g. `503 Service Unavailable`.
    pub status_line: String,
    pub body:        BodyStream,
}

impl HttpResponse {
    pub fn new(status: u16, status_line: impl Into<String>, body: BodyStream) -> Self {
        Self { status, status_line: status_line.into(), body }
    }

    /// Drain the body into memory.
    pub async fn bytes(self) -> std::result::Result<Vec<u8>, StreamError> { collect_body(self.body).await }
}

/// Drain a body stream into memory.
pub async fn collect_body(mut body: BodyStream) -> std::result::Result<Vec<u8>, StreamError> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf)
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations own their timeout and redirect policy; the caller decides
/// which client serves which kind of request.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Issue a GET request with the given headers.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received (DNS failure,
    /// connection refused, timeout). Every status code is returned as a
    /// response.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::error::Error as _;
    use std::io;
    use std::time::Duration;

    use super::*;
    use crate::FetchError;
    use crate::core::is_corrupt_frame;

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Client without a request timeout, for archive downloads.
        pub fn new() -> Result<Self> { Self::with_timeout(None) }

        pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder.build().map_err(|e| FetchError::Client(Box::new(e)))?;
            Ok(Self { client })
        }

        pub fn from_client(client: reqwest::Client) -> Self { Self { client } }
    }

    impl HttpClient for ReqwestClient {
        async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse> {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key.as_str(), value.as_str());
            }

            let response = request.send().await.map_err(|e| FetchError::Request {
                url:    url.to_string(),
                source: Box::new(e),
            })?;

            let status = response.status();
            let body = response.bytes_stream().map(|chunk| chunk.map_err(classify_body_error));

            Ok(HttpResponse::new(status.as_u16(), status.to_string(), Box::pin(body)))
        }
    }

    /// Split body failures into malformed framing and broken connections.
    ///
    /// reqwest reports every body failure as a decode error, so the io kind in
    /// the source chain decides first.
    fn classify_body_error(err: reqwest::Error) -> StreamError {
        let mut source = err.source();
        while let Some(inner) = source {
            if let Some(io_err) = inner.downcast_ref::<io::Error>() {
                let kind = io_err.kind();
                return if is_corrupt_frame(kind) {
                    StreamError::Corrupt(err.to_string())
                } else {
                    StreamError::Io(io::Error::new(kind, err.to_string()))
                };
            }
            source = inner.source();
        }

        if err.is_decode() || err.is_body() {
            StreamError::Corrupt(err.to_string())
        } else {
            StreamError::Io(io::Error::other(err))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
