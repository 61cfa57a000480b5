//! Registry transport and verified archive downloads.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and result types
//! - [`core`] - Pure status and fault classification
//! - [`effects`] - HTTP and filesystem I/O behind the [`HttpClient`] trait
//!
//! # Key Features
//!
//! - **Single-Pass**: archive bytes are hashed while they are written
//! - **Explicit Clients**: metadata and archive requests use separately configured clients
//! - **Bounded Retry**: only malformed response streams are retried, checksum failures never are

pub mod core;
pub mod data;
mod effects;
mod error;

pub use data::{DownloadOptions, DownloadReport, HostHeaders};
pub use effects::{ArchiveDownloader, BodyStream, BoxStream, HttpClient, HttpResponse, Transport};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Response4xxError, Result, StreamError};
