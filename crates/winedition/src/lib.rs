//! winedition - Windows edition and server-role classification.
//!
//! Turns raw version telemetry (version triple, product type, suite mask,
//! service pack, SKU code) into a marketing name such as "Windows Server
//! 2019" and answers cluster / core / datacenter role questions. The
//! classifier itself performs no I/O; platform queries live behind the
//! traits in [`platform`].

pub mod classifier;
pub mod config;
pub mod error;
pub mod platform;
pub mod rules;
pub mod sku;
pub mod snapshot;

pub use classifier::{Classification, EditionClassifier, CREATORS_UPDATE_BUILD};
pub use config::ClassifierConfig;
pub use error::{ConfigError, PlatformQueryError, UnknownServerRole};
pub use platform::{FixedMetrics, PlatformQuery, SystemMetrics, SM_SERVERR2};
pub use rules::{Discriminator, RuleTable, VersionRule};
pub use sku::{ServerRole, SkuRegistry};
pub use snapshot::{ExtendedVersionInfo, ProductType, SuiteMask, VersionSnapshot, VersionTriple};
