//! SKU codes and server-role registry.
//!
//! GetProductInfo returns a PRODUCT_* code. A server role (cluster, core,
//! datacenter) owns every code whose symbolic name contains the role word,
//! compared case-insensitively. Several codes carry more than one role,
//! e.g. PRODUCT_DATACENTER_SERVER_CORE is both core and datacenter, and
//! the client PRODUCT_CORE* editions count as core too.

use crate::error::UnknownServerRole;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A named PRODUCT_* constant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuConstant {
    pub value: u32,
    pub name: &'static str,
}

const fn sku(value: u32, name: &'static str) -> SkuConstant {
    SkuConstant { value, name }
}

/// PRODUCT_* values from winnt.h
pub static SKU_CONSTANTS: &[SkuConstant] = &[
    sku(0x0000_0000, "PRODUCT_UNDEFINED"),
    sku(0x0000_0001, "PRODUCT_ULTIMATE"),
    sku(0x0000_0002, "PRODUCT_HOME_BASIC"),
    sku(0x0000_0003, "PRODUCT_HOME_PREMIUM"),
    sku(0x0000_0004, "PRODUCT_ENTERPRISE"),
    sku(0x0000_0005, "PRODUCT_HOME_BASIC_N"),
    sku(0x0000_0006, "PRODUCT_BUSINESS"),
    sku(0x0000_0007, "PRODUCT_STANDARD_SERVER"),
    sku(0x0000_0008, "PRODUCT_DATACENTER_SERVER"),
    sku(0x0000_0009, "PRODUCT_SMALLBUSINESS_SERVER"),
    sku(0x0000_000A, "PRODUCT_ENTERPRISE_SERVER"),
    sku(0x0000_000B, "PRODUCT_STARTER"),
    sku(0x0000_000C, "PRODUCT_DATACENTER_SERVER_CORE"),
    sku(0x0000_000D, "PRODUCT_STANDARD_SERVER_CORE"),
    sku(0x0000_000E, "PRODUCT_ENTERPRISE_SERVER_CORE"),
    sku(0x0000_000F, "PRODUCT_ENTERPRISE_SERVER_IA64"),
    sku(0x0000_0010, "PRODUCT_BUSINESS_N"),
    sku(0x0000_0011, "PRODUCT_WEB_SERVER"),
    sku(0x0000_0012, "PRODUCT_CLUSTER_SERVER"),
    sku(0x0000_0013, "PRODUCT_HOME_SERVER"),
    sku(0x0000_0014, "PRODUCT_STORAGE_EXPRESS_SERVER"),
    sku(0x0000_0015, "PRODUCT_STORAGE_STANDARD_SERVER"),
    sku(0x0000_0016, "PRODUCT_STORAGE_WORKGROUP_SERVER"),
    sku(0x0000_0017, "PRODUCT_STORAGE_ENTERPRISE_SERVER"),
    sku(0x0000_0018, "PRODUCT_SERVER_FOR_SMALLBUSINESS"),
    sku(0x0000_0019, "PRODUCT_SMALLBUSINESS_SERVER_PREMIUM"),
    sku(0x0000_001A, "PRODUCT_HOME_PREMIUM_N"),
    sku(0x0000_001B, "PRODUCT_ENTERPRISE_N"),
    sku(0x0000_001C, "PRODUCT_ULTIMATE_N"),
    sku(0x0000_001D, "PRODUCT_WEB_SERVER_CORE"),
    sku(0x0000_001E, "PRODUCT_MEDIUMBUSINESS_SERVER_MANAGEMENT"),
    sku(0x0000_001F, "PRODUCT_MEDIUMBUSINESS_SERVER_SECURITY"),
    sku(0x0000_0020, "PRODUCT_MEDIUMBUSINESS_SERVER_MESSAGING"),
    sku(0x0000_0021, "PRODUCT_SERVER_FOUNDATION"),
    sku(0x0000_0022, "PRODUCT_HOME_PREMIUM_SERVER"),
    sku(0x0000_0023, "PRODUCT_SERVER_FOR_SMALLBUSINESS_V"),
    sku(0x0000_0024, "PRODUCT_STANDARD_SERVER_V"),
    sku(0x0000_0025, "PRODUCT_DATACENTER_SERVER_V"),
    sku(0x0000_0026, "PRODUCT_ENTERPRISE_SERVER_V"),
    sku(0x0000_0027, "PRODUCT_DATACENTER_SERVER_CORE_V"),
    sku(0x0000_0028, "PRODUCT_STANDARD_SERVER_CORE_V"),
    sku(0x0000_0029, "PRODUCT_ENTERPRISE_SERVER_CORE_V"),
    sku(0x0000_002A, "PRODUCT_HYPERV"),
    sku(0x0000_002B, "PRODUCT_STORAGE_EXPRESS_SERVER_CORE"),
    sku(0x0000_002C, "PRODUCT_STORAGE_STANDARD_SERVER_CORE"),
    sku(0x0000_002D, "PRODUCT_STORAGE_WORKGROUP_SERVER_CORE"),
    sku(0x0000_002E, "PRODUCT_STORAGE_ENTERPRISE_SERVER_CORE"),
    sku(0x0000_002F, "PRODUCT_STARTER_N"),
    sku(0x0000_0030, "PRODUCT_PROFESSIONAL"),
    sku(0x0000_0031, "PRODUCT_PROFESSIONAL_N"),
    sku(0x0000_0032, "PRODUCT_SB_SOLUTION_SERVER"),
    sku(0x0000_0033, "PRODUCT_SERVER_FOR_SB_SOLUTIONS"),
    sku(0x0000_0034, "PRODUCT_STANDARD_SERVER_SOLUTIONS"),
    sku(0x0000_0035, "PRODUCT_STANDARD_SERVER_SOLUTIONS_CORE"),
    sku(0x0000_0036, "PRODUCT_SB_SOLUTION_SERVER_EM"),
    sku(0x0000_0037, "PRODUCT_SERVER_FOR_SB_SOLUTIONS_EM"),
    sku(0x0000_0038, "PRODUCT_SOLUTION_EMBEDDEDSERVER"),
    sku(0x0000_0039, "PRODUCT_SOLUTION_EMBEDDEDSERVER_CORE"),
    sku(0x0000_003B, "PRODUCT_ESSENTIALBUSINESS_SERVER_MGMT"),
    sku(0x0000_003C, "PRODUCT_ESSENTIALBUSINESS_SERVER_ADDL"),
    sku(0x0000_003D, "PRODUCT_ESSENTIALBUSINESS_SERVER_MGMTSVC"),
    sku(0x0000_003E, "PRODUCT_ESSENTIALBUSINESS_SERVER_ADDLSVC"),
    sku(0x0000_003F, "PRODUCT_SMALLBUSINESS_SERVER_PREMIUM_CORE"),
    sku(0x0000_0040, "PRODUCT_CLUSTER_SERVER_V"),
    sku(0x0000_0041, "PRODUCT_EMBEDDED"),
    sku(0x0000_0042, "PRODUCT_STARTER_E"),
    sku(0x0000_0043, "PRODUCT_HOME_BASIC_E"),
    sku(0x0000_0044, "PRODUCT_HOME_PREMIUM_E"),
    sku(0x0000_0045, "PRODUCT_PROFESSIONAL_E"),
    sku(0x0000_0046, "PRODUCT_ENTERPRISE_E"),
    sku(0x0000_0047, "PRODUCT_ULTIMATE_E"),
    sku(0x0000_0048, "PRODUCT_ENTERPRISE_EVALUATION"),
    sku(0x0000_004C, "PRODUCT_MULTIPOINT_STANDARD_SERVER"),
    sku(0x0000_004D, "PRODUCT_MULTIPOINT_PREMIUM_SERVER"),
    sku(0x0000_004F, "PRODUCT_STANDARD_EVALUATION_SERVER"),
    sku(0x0000_0050, "PRODUCT_DATACENTER_EVALUATION_SERVER"),
    sku(0x0000_0054, "PRODUCT_ENTERPRISE_N_EVALUATION"),
    sku(0x0000_005F, "PRODUCT_STORAGE_WORKGROUP_EVALUATION_SERVER"),
    sku(0x0000_0060, "PRODUCT_STORAGE_STANDARD_EVALUATION_SERVER"),
    sku(0x0000_0061, "PRODUCT_CORE_ARM"),
    sku(0x0000_0062, "PRODUCT_CORE_N"),
    sku(0x0000_0063, "PRODUCT_CORE_COUNTRYSPECIFIC"),
    sku(0x0000_0064, "PRODUCT_CORE_SINGLELANGUAGE"),
    sku(0x0000_0065, "PRODUCT_CORE"),
    sku(0x0000_0067, "PRODUCT_PROFESSIONAL_WMC"),
    sku(0x0000_0068, "PRODUCT_MOBILE_CORE"),
    sku(0x0000_0079, "PRODUCT_EDUCATION"),
    sku(0x0000_007A, "PRODUCT_EDUCATION_N"),
    sku(0x0000_007D, "PRODUCT_ENTERPRISE_S"),
    sku(0x0000_007E, "PRODUCT_ENTERPRISE_S_N"),
    sku(0x0000_0081, "PRODUCT_ENTERPRISE_S_EVALUATION"),
    sku(0x0000_0082, "PRODUCT_ENTERPRISE_S_N_EVALUATION"),
    sku(0x0000_008F, "PRODUCT_DATACENTER_NANO_SERVER"),
    sku(0x0000_0090, "PRODUCT_STANDARD_NANO_SERVER"),
    sku(0x0000_0091, "PRODUCT_DATACENTER_A_SERVER_CORE"),
    sku(0x0000_0092, "PRODUCT_STANDARD_A_SERVER_CORE"),
    sku(0x0000_0093, "PRODUCT_DATACENTER_WS_SERVER_CORE"),
    sku(0x0000_0094, "PRODUCT_STANDARD_WS_SERVER_CORE"),
    sku(0x0000_00A1, "PRODUCT_PRO_WORKSTATION"),
    sku(0x0000_00A2, "PRODUCT_PRO_WORKSTATION_N"),
    sku(0x0000_00A4, "PRODUCT_PRO_FOR_EDUCATION"),
    sku(0x0000_00A5, "PRODUCT_PRO_FOR_EDUCATION_N"),
    sku(0xABCD_ABCD, "PRODUCT_UNLICENSED"),
];

/// Server role derived from the SKU code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerRole {
    Cluster,
    Core,
    Datacenter,
}

impl ServerRole {
    pub const ALL: [ServerRole; 3] = [ServerRole::Cluster, ServerRole::Core, ServerRole::Datacenter];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerRole::Cluster => "cluster",
            ServerRole::Core => "core",
            ServerRole::Datacenter => "datacenter",
        }
    }
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerRole {
    type Err = UnknownServerRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cluster" => Ok(ServerRole::Cluster),
            "core" => Ok(ServerRole::Core),
            "datacenter" => Ok(ServerRole::Datacenter),
            _ => Err(UnknownServerRole(s.to_string())),
        }
    }
}

static BUILTIN_REGISTRY: Lazy<Arc<SkuRegistry>> =
    Lazy::new(|| Arc::new(SkuRegistry::from_constants(SKU_CONSTANTS)));

/// Role -> SKU values, plus value -> symbolic name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuRegistry {
    roles: BTreeMap<ServerRole, BTreeSet<u32>>,
    names: BTreeMap<u32, &'static str>,
}

impl SkuRegistry {
    /// The process-wide registry over [`SKU_CONSTANTS`]
    pub fn builtin() -> Arc<SkuRegistry> {
        Arc::clone(&BUILTIN_REGISTRY)
    }

    /// Tag each constant with every role word its name contains
    pub fn from_constants(constants: &[SkuConstant]) -> Self {
        let mut registry = Self::default();
        for constant in constants {
            let lowered = constant.name.to_ascii_lowercase();
            for role in ServerRole::ALL {
                if lowered.contains(role.as_str()) {
                    registry.roles.entry(role).or_default().insert(constant.value);
                }
            }
            registry.names.entry(constant.value).or_insert(constant.name);
        }
        registry
    }

    pub fn has_role(&self, role: ServerRole, sku: u32) -> bool {
        self.roles
            .get(&role)
            .map(|values| values.contains(&sku))
            .unwrap_or(false)
    }

    /// Every role the code carries, in Cluster, Core, Datacenter order
    pub fn roles_for(&self, sku: u32) -> Vec<ServerRole> {
        ServerRole::ALL
            .into_iter()
            .filter(|role| self.has_role(*role, sku))
            .collect()
    }

    pub fn values_for(&self, role: ServerRole) -> impl Iterator<Item = u32> + '_ {
        self.roles.get(&role).into_iter().flatten().copied()
    }

    pub fn name_of(&self, sku: u32) -> Option<&'static str> {
        self.names.get(&sku).copied()
    }
}
