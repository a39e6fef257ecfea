//! Edition rule table.
//!
//! Windows reuses one (major, minor) pair across several shipped editions.
//! Each rule pairs a marketing name with an exact version match and an
//! optional discriminator that tells the editions apart. The table is
//! scanned front to back and the first matching rule names the system, so
//! declaration order is part of the data.

use crate::error::ConfigError;
use crate::platform::{SystemMetrics, SM_SERVERR2};
use crate::snapshot::{SuiteMask, VersionSnapshot};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Extra condition checked once major/minor already match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discriminator {
    /// Product type is workstation
    Workstation,
    /// Product type is a server or domain controller
    NotWorkstation,
    BuildAtLeast { build: u32 },
    BuildAtMost { build: u32 },
    /// Any of the given suite bits is set
    SuiteAny { mask: SuiteMask },
    /// Queries the metric source; only evaluated when reached
    SystemMetric { metric: i32, nonzero: bool },
    /// Every inner condition holds (short-circuits left to right)
    All { of: Vec<Discriminator> },
}

impl Discriminator {
    pub fn all(of: impl IntoIterator<Item = Discriminator>) -> Self {
        Discriminator::All {
            of: of.into_iter().collect(),
        }
    }

    pub fn evaluate(&self, snapshot: &VersionSnapshot, metrics: &dyn SystemMetrics) -> bool {
        match self {
            Discriminator::Workstation => snapshot.is_workstation(),
            Discriminator::NotWorkstation => !snapshot.is_workstation(),
            Discriminator::BuildAtLeast { build } => snapshot.build_number() >= *build,
            Discriminator::BuildAtMost { build } => snapshot.build_number() <= *build,
            Discriminator::SuiteAny { mask } => snapshot.suite_mask().intersects(*mask),
            Discriminator::SystemMetric { metric, nonzero } => {
                let value = metrics.system_metric(*metric);
                debug!(metric, value, "queried system metric");
                (value != 0) == *nonzero
            }
            Discriminator::All { of } => of.iter().all(|d| d.evaluate(snapshot, metrics)),
        }
    }
}

/// One row of the rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRule {
    pub name: String,
    pub major: u32,
    pub minor: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
}

impl VersionRule {
    pub fn new(name: impl Into<String>, major: u32, minor: u32) -> Self {
        Self {
            name: name.into(),
            major,
            minor,
            discriminator: None,
        }
    }

    pub fn when(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn version_matches(&self, snapshot: &VersionSnapshot) -> bool {
        snapshot.major_version() == self.major && snapshot.minor_version() == self.minor
    }

    /// Version match AND discriminator. Ignores every other rule in the table.
    pub fn matches(&self, snapshot: &VersionSnapshot, metrics: &dyn SystemMetrics) -> bool {
        if !self.version_matches(snapshot) {
            return false;
        }
        match &self.discriminator {
            Some(discriminator) => discriminator.evaluate(snapshot, metrics),
            None => true,
        }
    }
}

static BUILTIN_RULES: Lazy<Arc<RuleTable>> = Lazy::new(|| Arc::new(RuleTable::builtin_rules()));

/// Ordered, read-only list of edition rules with unique names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<VersionRule>,
}

impl RuleTable {
    /// The process-wide built-in table
    pub fn builtin() -> Arc<RuleTable> {
        Arc::clone(&BUILTIN_RULES)
    }

    /// Validate and wrap a rule list. Names must be unique and the list non-empty.
    pub fn from_rules(rules: Vec<VersionRule>) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::DuplicateRule(rule.name.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// Parse a TOML document with a `[[rules]]` array
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct RuleFile {
            rules: Vec<VersionRule>,
        }
        let file: RuleFile = toml::from_str(content)?;
        Self::from_rules(file.rules)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml_str(&content)?;
        info!(path = %path.display(), rules = table.len(), "loaded rule table");
        Ok(table)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionRule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&VersionRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Render as the TOML accepted by [`RuleTable::from_toml_str`]
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        #[derive(Serialize)]
        struct RuleFile<'a> {
            rules: &'a [VersionRule],
        }
        toml::to_string_pretty(&RuleFile { rules: &self.rules })
    }

    fn builtin_rules() -> Self {
        use Discriminator::*;

        let server_from = |build: u32| Discriminator::all([NotWorkstation, BuildAtLeast { build }]);
        let server_r2 = |nonzero: bool| SystemMetric {
            metric: SM_SERVERR2,
            nonzero,
        };

        Self {
            rules: vec![
                VersionRule::new("Windows Server 2022", 10, 0).when(server_from(20348)),
                VersionRule::new("Windows Server 2019", 10, 0).when(server_from(17763)),
                VersionRule::new("Windows 10", 10, 0).when(Workstation),
                VersionRule::new("Windows Server 2016", 10, 0)
                    .when(Discriminator::all([NotWorkstation, BuildAtMost { build: 14393 }])),
                VersionRule::new("Windows 8.1", 6, 3).when(Workstation),
                VersionRule::new("Windows Server 2012 R2", 6, 3).when(NotWorkstation),
                VersionRule::new("Windows 8", 6, 2).when(Workstation),
                VersionRule::new("Windows Server 2012", 6, 2).when(NotWorkstation),
                VersionRule::new("Windows 7", 6, 1).when(Workstation),
                VersionRule::new("Windows Server 2008 R2", 6, 1).when(NotWorkstation),
                VersionRule::new("Windows Server 2008", 6, 0).when(NotWorkstation),
                VersionRule::new("Windows Vista", 6, 0).when(Workstation),
                VersionRule::new("Windows Server 2003 R2", 5, 2).when(server_r2(true)),
                VersionRule::new("Windows Home Server", 5, 2).when(SuiteAny {
                    mask: SuiteMask::WH_SERVER,
                }),
                VersionRule::new("Windows Server 2003", 5, 2).when(server_r2(false)),
                VersionRule::new("Windows XP", 5, 1),
                VersionRule::new("Windows 2000", 5, 0),
            ],
        }
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin_rules()
    }
}
