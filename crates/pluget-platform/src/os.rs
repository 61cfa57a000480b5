//! Operating system detection.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Operating system types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    FreeBsd,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
            Os::FreeBsd => "freebsd",
        }
    }
}

/// Detect the operating system this binary was built for.
pub fn detect() -> crate::Result<Os> { std::env::consts::OS.parse() }

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "macos" | "darwin" => Ok(Os::Darwin),
            "windows" => Ok(Os::Windows),
            "freebsd" => Ok(Os::FreeBsd),
            _ => Err(Error::UnknownOS(s.to_string())),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
