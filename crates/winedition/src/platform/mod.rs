//! Platform collaborators.
//!
//! The classifier never talks to the OS. Callers hand it a snapshot built
//! from a [`PlatformQuery`] and, for the 5.2 tier, a [`SystemMetrics`]
//! source that is queried lazily.

use crate::error::PlatformQueryError;
use crate::snapshot::{ExtendedVersionInfo, VersionTriple};
use std::collections::BTreeMap;

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use self::windows::WindowsPlatform;

/// GetSystemMetrics index that is nonzero on Windows Server 2003 R2
pub const SM_SERVERR2: i32 = 89;

/// The three queries a snapshot is built from.
pub trait PlatformQuery {
    fn version_triple(&self) -> Result<VersionTriple, PlatformQueryError>;

    fn extended_version_info(&self) -> Result<ExtendedVersionInfo, PlatformQueryError>;

    fn sku_code(
        &self,
        major: u32,
        minor: u32,
        service_pack_major: u16,
        service_pack_minor: u16,
    ) -> Result<u32, PlatformQueryError>;
}

/// System metric lookup (GetSystemMetrics on Windows).
pub trait SystemMetrics {
    fn system_metric(&self, metric: i32) -> i32;
}

impl<F> SystemMetrics for F
where
    F: Fn(i32) -> i32,
{
    fn system_metric(&self, metric: i32) -> i32 {
        self(metric)
    }
}

/// In-memory metric values. Unset metrics read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedMetrics {
    values: BTreeMap<i32, i32>,
}

impl FixedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: i32, value: i32) -> Self {
        self.values.insert(metric, value);
        self
    }

    /// Metrics of a Windows Server 2003 R2 install
    pub fn server_r2() -> Self {
        Self::new().with(SM_SERVERR2, 1)
    }
}

impl SystemMetrics for FixedMetrics {
    fn system_metric(&self, metric: i32) -> i32 {
        self.values.get(&metric).copied().unwrap_or(0)
    }
}

/// Metric source for the live machine, or zeros where no platform exists
pub fn host_metrics() -> Box<dyn SystemMetrics + Send + Sync> {
    #[cfg(windows)]
    {
        Box::new(WindowsPlatform)
    }
    #[cfg(not(windows))]
    {
        Box::new(FixedMetrics::new())
    }
}

/// Platform for the live machine
#[cfg(windows)]
pub fn host_platform() -> Result<WindowsPlatform, PlatformQueryError> {
    Ok(WindowsPlatform)
}

/// Platform for the live machine
#[cfg(not(windows))]
pub fn host_platform() -> Result<Unsupported, PlatformQueryError> {
    Err(PlatformQueryError::Unsupported)
}

/// Stand-in platform type on targets without Windows APIs
#[cfg(not(windows))]
#[derive(Debug, Clone, Copy)]
pub struct Unsupported;

#[cfg(not(windows))]
impl PlatformQuery for Unsupported {
    fn version_triple(&self) -> Result<VersionTriple, PlatformQueryError> {
        Err(PlatformQueryError::Unsupported)
    }

    fn extended_version_info(&self) -> Result<ExtendedVersionInfo, PlatformQueryError> {
        Err(PlatformQueryError::Unsupported)
    }

    fn sku_code(&self, _: u32, _: u32, _: u16, _: u16) -> Result<u32, PlatformQueryError> {
        Err(PlatformQueryError::Unsupported)
    }
}
