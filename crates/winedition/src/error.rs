//! Error types for winedition.
//!
//! "No matching edition" is not represented here. Resolution returns
//! `Option<&str>` and `None` means the rule table does not know the version.

use std::path::PathBuf;
use thiserror::Error;

/// A platform collaborator failed while a snapshot was being captured.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformQueryError {
    #[error("version triple query failed: {0}")]
    VersionTriple(String),

    #[error("extended version info query failed: {0}")]
    ExtendedInfo(String),

    #[error("SKU query failed: {0}")]
    Sku(String),

    #[error("unknown product type code {0}")]
    InvalidProductType(u8),

    #[error("platform queries are not supported on this target")]
    Unsupported,
}

impl PlatformQueryError {
    /// Name of the collaborator that produced the error
    pub fn source_name(&self) -> &'static str {
        match self {
            PlatformQueryError::VersionTriple(_) => "version_triple",
            PlatformQueryError::ExtendedInfo(_) | PlatformQueryError::InvalidProductType(_) => {
                "extended_info"
            }
            PlatformQueryError::Sku(_) => "sku",
            PlatformQueryError::Unsupported => "platform",
        }
    }
}

/// Loading or validating a rule table / config file failed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("rule table declares {0:?} more than once")]
    DuplicateRule(String),

    #[error("rule table is empty")]
    EmptyTable,
}

/// Role string outside cluster / core / datacenter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown server role {0:?} (expected cluster, core or datacenter)")]
pub struct UnknownServerRole(pub String);
