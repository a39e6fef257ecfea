//! Version snapshot - the raw OS attributes a classification runs against.
//!
//! A snapshot is captured once from the platform collaborators and never
//! re-queried. Every classifier predicate is a pure function of one snapshot.

use crate::error::PlatformQueryError;
use crate::platform::PlatformQuery;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::info;

/// Product type as reported in the extended version info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// VER_NT_WORKSTATION (1)
    Workstation,
    /// VER_NT_DOMAIN_CONTROLLER (2)
    ServerOrDomainController,
    /// VER_NT_SERVER (3)
    OtherServer,
}

impl ProductType {
    pub fn is_workstation(&self) -> bool {
        matches!(self, ProductType::Workstation)
    }

    pub fn code(&self) -> u8 {
        match self {
            ProductType::Workstation => 1,
            ProductType::ServerOrDomainController => 2,
            ProductType::OtherServer => 3,
        }
    }
}

impl TryFrom<u8> for ProductType {
    type Error = PlatformQueryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Workstation),
            2 => Ok(Self::ServerOrDomainController),
            3 => Ok(Self::OtherServer),
            other => Err(PlatformQueryError::InvalidProductType(other)),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::Workstation => write!(f, "workstation"),
            ProductType::ServerOrDomainController => write!(f, "domain controller"),
            ProductType::OtherServer => write!(f, "server"),
        }
    }
}

bitflags! {
    /// VER_SUITE_* bits of the extended version info
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SuiteMask: u16 {
        const SMALLBUSINESS = 0x0001;
        const ENTERPRISE = 0x0002;
        const BACKOFFICE = 0x0004;
        const COMMUNICATIONS = 0x0008;
        const TERMINAL = 0x0010;
        const SMALLBUSINESS_RESTRICTED = 0x0020;
        const EMBEDDED_NT = 0x0040;
        const DATACENTER = 0x0080;
        const SINGLEUSERTS = 0x0100;
        const PERSONAL = 0x0200;
        const BLADE = 0x0400;
        const EMBEDDED_RESTRICTED = 0x0800;
        const SECURITY_APPLIANCE = 0x1000;
        const STORAGE_SERVER = 0x2000;
        const COMPUTE_SERVER = 0x4000;
        const WH_SERVER = 0x8000;
    }
}

// Serialized as the raw integer so the mask is stored exactly as the platform reported it.
impl Serialize for SuiteMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

impl<'de> Deserialize<'de> for SuiteMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u16::deserialize(deserializer).map(SuiteMask::from_bits_retain)
    }
}

/// (major, minor, build) as returned by the version query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
}

impl VersionTriple {
    pub fn new(major: u32, minor: u32, build: u32) -> Self {
        Self { major, minor, build }
    }
}

/// Product type, suite mask and service pack levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedVersionInfo {
    pub product_type: ProductType,
    pub suite_mask: SuiteMask,
    pub service_pack_major: u16,
    pub service_pack_minor: u16,
}

impl ExtendedVersionInfo {
    pub fn new(product_type: ProductType) -> Self {
        Self {
            product_type,
            suite_mask: SuiteMask::empty(),
            service_pack_major: 0,
            service_pack_minor: 0,
        }
    }

    pub fn with_suite_mask(mut self, suite_mask: SuiteMask) -> Self {
        self.suite_mask = suite_mask;
        self
    }

    pub fn with_service_pack(mut self, major: u16, minor: u16) -> Self {
        self.service_pack_major = major;
        self.service_pack_minor = minor;
        self
    }
}

/// Immutable record of the raw version attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    major_version: u32,
    minor_version: u32,
    build_number: u32,
    product_type: ProductType,
    #[serde(default)]
    suite_mask: SuiteMask,
    #[serde(default)]
    service_pack_major: u16,
    #[serde(default)]
    service_pack_minor: u16,
    sku: u32,
}

impl VersionSnapshot {
    /// Assemble a snapshot from already-queried parts. Values are kept verbatim.
    pub fn new(triple: VersionTriple, extended: ExtendedVersionInfo, sku: u32) -> Self {
        Self {
            major_version: triple.major,
            minor_version: triple.minor,
            build_number: triple.build,
            product_type: extended.product_type,
            suite_mask: extended.suite_mask,
            service_pack_major: extended.service_pack_major,
            service_pack_minor: extended.service_pack_minor,
            sku,
        }
    }

    /// Query the three snapshot collaborators in order.
    ///
    /// The SKU query receives the version and service pack numbers from the
    /// first two queries. Any failure aborts capture; no partial snapshot
    /// is ever returned.
    pub fn capture<P: PlatformQuery + ?Sized>(platform: &P) -> Result<Self, PlatformQueryError> {
        let triple = platform.version_triple()?;
        let extended = platform.extended_version_info()?;
        let sku = platform.sku_code(
            triple.major,
            triple.minor,
            extended.service_pack_major,
            extended.service_pack_minor,
        )?;

        let snapshot = Self::new(triple, extended, sku);
        info!(
            version = %snapshot.version_string(),
            product_type = %snapshot.product_type,
            sku = snapshot.sku,
            "captured version snapshot"
        );
        Ok(snapshot)
    }

    pub fn major_version(&self) -> u32 {
        self.major_version
    }

    pub fn minor_version(&self) -> u32 {
        self.minor_version
    }

    pub fn build_number(&self) -> u32 {
        self.build_number
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    pub fn suite_mask(&self) -> SuiteMask {
        self.suite_mask
    }

    pub fn service_pack_major(&self) -> u16 {
        self.service_pack_major
    }

    pub fn service_pack_minor(&self) -> u16 {
        self.service_pack_minor
    }

    pub fn sku(&self) -> u32 {
        self.sku
    }

    pub fn is_workstation(&self) -> bool {
        self.product_type.is_workstation()
    }

    /// "major.minor.build", e.g. "10.0.19045"
    pub fn version_string(&self) -> String {
        format!(
            "{}.{}.{}",
            self.major_version, self.minor_version, self.build_number
        )
    }

    /// "Service Pack 2", "Service Pack 1.1", or None when no service pack is installed
    pub fn service_pack_label(&self) -> Option<String> {
        match (self.service_pack_major, self.service_pack_minor) {
            (0, 0) => None,
            (major, 0) => Some(format!("Service Pack {}", major)),
            (major, minor) => Some(format!("Service Pack {}.{}", major, minor)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_codes() {
        assert_eq!(ProductType::try_from(1), Ok(ProductType::Workstation));
        assert_eq!(
            ProductType::try_from(2),
            Ok(ProductType::ServerOrDomainController)
        );
        assert_eq!(ProductType::try_from(3), Ok(ProductType::OtherServer));
        assert_eq!(
            ProductType::try_from(0),
            Err(PlatformQueryError::InvalidProductType(0))
        );
        assert_eq!(ProductType::OtherServer.code(), 3);
    }

    #[test]
    fn test_snapshot_keeps_values_verbatim() {
        let ext = ExtendedVersionInfo::new(ProductType::OtherServer)
            .with_suite_mask(SuiteMask::from_bits_retain(0x8000 | 0x0010))
            .with_service_pack(2, 0);
        let snap = VersionSnapshot::new(VersionTriple::new(5, 2, 3790), ext, 7);

        assert_eq!(snap.major_version(), 5);
        assert_eq!(snap.minor_version(), 2);
        assert_eq!(snap.build_number(), 3790);
        assert!(snap.suite_mask().contains(SuiteMask::WH_SERVER));
        assert!(snap.suite_mask().contains(SuiteMask::TERMINAL));
        assert_eq!(snap.sku(), 7);
        assert!(!snap.is_workstation());
    }

    #[test]
    fn test_version_string_and_service_pack() {
        let ext = ExtendedVersionInfo::new(ProductType::Workstation).with_service_pack(3, 0);
        let snap = VersionSnapshot::new(VersionTriple::new(5, 1, 2600), ext, 0);
        assert_eq!(snap.version_string(), "5.1.2600");
        assert_eq!(snap.service_pack_label().as_deref(), Some("Service Pack 3"));

        let ext = ExtendedVersionInfo::new(ProductType::Workstation).with_service_pack(1, 1);
        let snap = VersionSnapshot::new(VersionTriple::new(6, 0, 6001), ext, 0);
        assert_eq!(snap.service_pack_label().as_deref(), Some("Service Pack 1.1"));

        let ext = ExtendedVersionInfo::new(ProductType::Workstation);
        let snap = VersionSnapshot::new(VersionTriple::new(10, 0, 19045), ext, 0);
        assert_eq!(snap.service_pack_label(), None);
    }

    #[test]
    fn test_json_suite_mask_is_raw_integer() {
        let json = r#"{
            "major_version": 10,
            "minor_version": 0,
            "build_number": 19045,
            "product_type": "workstation",
            "suite_mask": 769,
            "sku": 48
        }"#;
        let snap: VersionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.suite_mask().bits(), 769);
        assert_eq!(snap.service_pack_major(), 0);

        let back = serde_json::to_value(snap).unwrap();
        assert_eq!(back["suite_mask"], 769);
        assert_eq!(back["product_type"], "workstation");
    }

    #[test]
    fn test_json_requires_sku() {
        let json = r#"{
            "major_version": 10,
            "minor_version": 0,
            "build_number": 19045,
            "product_type": "workstation"
        }"#;
        let err = serde_json::from_str::<VersionSnapshot>(json).unwrap_err();
        assert!(err.to_string().contains("missing field `sku`"));
    }
}
