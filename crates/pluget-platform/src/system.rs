use std::fmt;

use crate::arch::{self, Arch};
use crate::os::{self, Os};

/// Architecture key a release uses to declare it runs anywhere.
pub const WILDCARD_ARCH: &str = "any";

/// The host a plugin is being acquired for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    host_name:    String,
    host_version: String,
    os:           Os,
    arch:         Arch,
}

impl SystemInfo {
    pub fn new(host_name: impl Into<String>, host_version: impl Into<String>, os: Os, arch: Arch) -> Self {
        Self {
            host_name: host_name.into(),
            host_version: host_version.into(),
            os,
            arch,
        }
    }

    /// Describe the running host.
    pub fn detect(host_name: impl Into<String>, host_version: impl Into<String>) -> crate::Result<Self> {
        Ok(Self::new(host_name, host_version, os::detect()?, arch::detect()?))
    }

    pub fn host_name(&self) -> &str { &self.host_name }

    pub fn host_version(&self) -> &str { &self.host_version }

    pub fn os(&self) -> Os { self.os }

    pub fn arch(&self) -> Arch { self.arch }

    /// Registry key for this host, e.g. `linux-amd64`.
    pub fn arch_key(&self) -> String { format!("{}-{}", self.os, self.arch) }

    /// Whether a release's architecture key can run on this host.
    pub fn accepts(&self, key: &str) -> bool {
        key == WILDCARD_ARCH || key.eq_ignore_ascii_case(&self.arch_key())
    }
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} {}", self.host_name, self.host_version, self.arch_key())
    }
}
