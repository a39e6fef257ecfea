//! Tests for snapshot capture through the platform collaborators

use std::cell::RefCell;
use winedition::{
    EditionClassifier, ExtendedVersionInfo, PlatformQuery, PlatformQueryError, ProductType,
    SuiteMask, VersionSnapshot, VersionTriple,
};

/// Scripted platform that records the SKU query arguments
struct FakePlatform {
    triple: Result<VersionTriple, PlatformQueryError>,
    extended: Result<ExtendedVersionInfo, PlatformQueryError>,
    sku: Result<u32, PlatformQueryError>,
    sku_args: RefCell<Option<(u32, u32, u16, u16)>>,
}

impl FakePlatform {
    fn server_2019_datacenter() -> Self {
        Self {
            triple: Ok(VersionTriple::new(10, 0, 17763)),
            extended: Ok(ExtendedVersionInfo::new(ProductType::OtherServer)
                .with_suite_mask(SuiteMask::DATACENTER | SuiteMask::TERMINAL)),
            sku: Ok(0x08),
            sku_args: RefCell::new(None),
        }
    }
}

impl PlatformQuery for FakePlatform {
    fn version_triple(&self) -> Result<VersionTriple, PlatformQueryError> {
        self.triple.clone()
    }

    fn extended_version_info(&self) -> Result<ExtendedVersionInfo, PlatformQueryError> {
        self.extended.clone()
    }

    fn sku_code(
        &self,
        major: u32,
        minor: u32,
        service_pack_major: u16,
        service_pack_minor: u16,
    ) -> Result<u32, PlatformQueryError> {
        *self.sku_args.borrow_mut() = Some((major, minor, service_pack_major, service_pack_minor));
        self.sku.clone()
    }
}

#[test]
fn test_capture_success() {
    let platform = FakePlatform::server_2019_datacenter();
    let snap = VersionSnapshot::capture(&platform).unwrap();

    assert_eq!(snap.major_version(), 10);
    assert_eq!(snap.build_number(), 17763);
    assert_eq!(snap.product_type(), ProductType::OtherServer);
    assert!(snap.suite_mask().contains(SuiteMask::DATACENTER));
    assert_eq!(snap.sku(), 0x08);
}

#[test]
fn test_sku_query_receives_version_and_service_pack() {
    let mut platform = FakePlatform::server_2019_datacenter();
    platform.triple = Ok(VersionTriple::new(6, 1, 7601));
    platform.extended = Ok(ExtendedVersionInfo::new(ProductType::OtherServer).with_service_pack(1, 0));

    VersionSnapshot::capture(&platform).unwrap();
    assert_eq!(*platform.sku_args.borrow(), Some((6, 1, 1, 0)));
}

#[test]
fn test_version_query_failure_stops_capture() {
    let mut platform = FakePlatform::server_2019_datacenter();
    platform.triple = Err(PlatformQueryError::VersionTriple("STATUS_ACCESS_DENIED".into()));

    let err = VersionSnapshot::capture(&platform).unwrap_err();
    assert_eq!(err.source_name(), "version_triple");
    // SKU query never ran
    assert!(platform.sku_args.borrow().is_none());
}

#[test]
fn test_extended_info_failure() {
    let mut platform = FakePlatform::server_2019_datacenter();
    platform.extended = Err(PlatformQueryError::InvalidProductType(9));

    let err = VersionSnapshot::capture(&platform).unwrap_err();
    assert_eq!(err, PlatformQueryError::InvalidProductType(9));
    assert_eq!(err.source_name(), "extended_info");
}

#[test]
fn test_sku_failure() {
    let mut platform = FakePlatform::server_2019_datacenter();
    platform.sku = Err(PlatformQueryError::Sku("GetProductInfo returned FALSE".into()));

    assert!(matches!(
        VersionSnapshot::capture(&platform),
        Err(PlatformQueryError::Sku(_))
    ));
}

#[test]
fn test_captured_snapshot_classifies() {
    let snap = VersionSnapshot::capture(&FakePlatform::server_2019_datacenter()).unwrap();
    let report = EditionClassifier::new().classify(snap);

    assert_eq!(report.marketing_name.as_deref(), Some("Windows Server 2019"));
    assert_eq!(report.sku_name, Some("PRODUCT_DATACENTER_SERVER"));
    assert_eq!(report.version, "10.0.17763");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["server_roles"], serde_json::json!(["datacenter"]));
    assert_eq!(json["snapshot"]["suite_mask"], 0x0090);
}

#[test]
fn test_error_messages() {
    let err = PlatformQueryError::ExtendedInfo("NTSTATUS 0xC0000005".into());
    assert_eq!(
        err.to_string(),
        "extended version info query failed: NTSTATUS 0xC0000005"
    );
    assert_eq!(
        PlatformQueryError::InvalidProductType(7).to_string(),
        "unknown product type code 7"
    );
}
