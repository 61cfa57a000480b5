//! I/O operations: HTTP requests, response interpretation and archive writes.

mod downloader;
mod http;
mod transport;

pub use downloader::ArchiveDownloader;
pub use http::{BodyStream, BoxStream, HttpClient, HttpResponse};
pub use transport::Transport;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
