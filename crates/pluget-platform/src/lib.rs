pub use error::{Error, Result};
pub use system::{SystemInfo, WILDCARD_ARCH};

pub mod arch;
mod error;
pub mod os;
mod system;
