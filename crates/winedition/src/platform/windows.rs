//! Live queries against the running Windows instance.

use super::{PlatformQuery, SystemMetrics};
use crate::error::PlatformQueryError;
use crate::snapshot::{ExtendedVersionInfo, ProductType, SuiteMask, VersionTriple};
use windows_sys::Wdk::System::SystemServices::RtlGetVersion;
use windows_sys::Win32::System::SystemInformation::{
    GetProductInfo, OSVERSIONINFOEXW, OSVERSIONINFOW,
};
use windows_sys::Win32::UI::WindowsAndMessaging::GetSystemMetrics;

/// RtlGetVersion / GetProductInfo / GetSystemMetrics
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    fn version_info(&self) -> Result<OSVERSIONINFOEXW, i32> {
        // SAFETY: OSVERSIONINFOEXW is plain data; zeroed is a valid initial state.
        let mut info: OSVERSIONINFOEXW = unsafe { std::mem::zeroed() };
        info.dwOSVersionInfoSize = std::mem::size_of::<OSVERSIONINFOEXW>() as u32;

        // SAFETY: the size field tells RtlGetVersion it may fill the EX layout.
        let status =
            unsafe { RtlGetVersion(&mut info as *mut OSVERSIONINFOEXW as *mut OSVERSIONINFOW) };
        if status < 0 {
            return Err(status);
        }
        Ok(info)
    }
}

impl PlatformQuery for WindowsPlatform {
    fn version_triple(&self) -> Result<VersionTriple, PlatformQueryError> {
        let info = self.version_info().map_err(|status| {
            PlatformQueryError::VersionTriple(format!("NTSTATUS {:#010X}", status))
        })?;
        Ok(VersionTriple::new(
            info.dwMajorVersion,
            info.dwMinorVersion,
            info.dwBuildNumber,
        ))
    }

    fn extended_version_info(&self) -> Result<ExtendedVersionInfo, PlatformQueryError> {
        let info = self.version_info().map_err(|status| {
            PlatformQueryError::ExtendedInfo(format!("NTSTATUS {:#010X}", status))
        })?;
        let product_type = ProductType::try_from(info.wProductType)?;
        Ok(ExtendedVersionInfo::new(product_type)
            .with_suite_mask(SuiteMask::from_bits_retain(info.wSuiteMask))
            .with_service_pack(info.wServicePackMajor, info.wServicePackMinor))
    }

    fn sku_code(
        &self,
        major: u32,
        minor: u32,
        service_pack_major: u16,
        service_pack_minor: u16,
    ) -> Result<u32, PlatformQueryError> {
        let mut sku: u32 = 0;
        // SAFETY: `sku` outlives the call and is a valid u32 out-pointer.
        let ok = unsafe {
            GetProductInfo(
                major,
                minor,
                service_pack_major as u32,
                service_pack_minor as u32,
                &mut sku,
            )
        };
        if ok == 0 {
            return Err(PlatformQueryError::Sku(format!(
                "GetProductInfo({}, {}, {}, {}) returned FALSE",
                major, minor, service_pack_major, service_pack_minor
            )));
        }
        Ok(sku)
    }
}

impl SystemMetrics for WindowsPlatform {
    fn system_metric(&self, metric: i32) -> i32 {
        // SAFETY: GetSystemMetrics has no pointer arguments.
        unsafe { GetSystemMetrics(metric) }
    }
}
