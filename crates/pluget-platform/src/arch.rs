//! Architecture detection.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// CPU architecture types, named the way plugin registries key them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    Amd64,
    Arm,
    Arm64,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86 => "386",
            Arch::Amd64 => "amd64",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
        }
    }
}

/// Detect the architecture this binary was built for.
pub fn detect() -> crate::Result<Arch> { std::env::consts::ARCH.parse() }

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i386" | "i686" | "386" => Ok(Arch::X86),
            "x86_64" | "amd64" => Ok(Arch::Amd64),
            "arm" | "armv7l" => Ok(Arch::Arm),
            "aarch64" | "arm64" => Ok(Arch::Arm64),
            _ => Err(Error::UnknownArch(s.to_string())),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
