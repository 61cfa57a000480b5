//! Streaming checksum primitives for downloaded plugin archives.
//!
//! Digests are accumulated incrementally while bytes move to their destination,
//! so an archive is only ever read once.
//!
//! # Example
//!
//! ```
//! use pluget_verify::{Checksum, Hasher};
//!
//! let expected: Checksum = "5EB63BBBE01EEED093CB22BB8F5ACDC3".parse().unwrap();
//! let mut hasher = expected.algorithm().hasher();
//! hasher.update(b"hello world");
//!
//! expected.verify(&hasher.finalize()).unwrap();
//! ```

pub use self::checksum::{Algorithm, Checksum};
pub use self::error::{Result, VerifyError};
pub use self::hasher::{AnyHasher, Hasher, Md5Hasher, Sha256Hasher};

mod checksum;
mod error;
mod hasher;
