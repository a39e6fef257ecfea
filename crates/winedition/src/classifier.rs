//! Edition classifier.
//!
//! Two questions are answered here and they are deliberately different:
//!
//! - [`EditionClassifier::resolve_marketing_name`] scans the table in order
//!   and reports the first rule that matches. This is the canonical name.
//! - [`EditionClassifier::is_edition`] checks one rule on its own. A
//!   Windows Server 2022 machine also satisfies the Server 2019 condition,
//!   so `is_edition("Windows Server 2019")` is true there even though the
//!   resolved name is "Windows Server 2022".

use crate::platform::{FixedMetrics, SystemMetrics};
use crate::rules::{RuleTable, VersionRule};
use crate::sku::{ServerRole, SkuRegistry};
use crate::snapshot::{ProductType, VersionSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// First build of Windows 10 version 1703 (Creators Update)
pub const CREATORS_UPDATE_BUILD: u32 = 15063;

const WINDOWS_10: &str = "Windows 10";

/// Rule table + SKU registry + metric source
pub struct EditionClassifier {
    rules: Arc<RuleTable>,
    skus: Arc<SkuRegistry>,
    metrics: Box<dyn SystemMetrics + Send + Sync>,
    creators_update_build: u32,
}

impl EditionClassifier {
    /// Built-in tables, metrics fixed at zero
    pub fn new() -> Self {
        Self::with_tables(RuleTable::builtin(), SkuRegistry::builtin())
    }

    pub fn with_tables(rules: Arc<RuleTable>, skus: Arc<SkuRegistry>) -> Self {
        Self {
            rules,
            skus,
            metrics: Box::new(FixedMetrics::new()),
            creators_update_build: CREATORS_UPDATE_BUILD,
        }
    }

    /// Metric source consulted by `system_metric` discriminators
    pub fn with_metrics(mut self, metrics: impl SystemMetrics + Send + Sync + 'static) -> Self {
        self.metrics = Box::new(metrics);
        self
    }

    pub fn with_boxed_metrics(mut self, metrics: Box<dyn SystemMetrics + Send + Sync>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_creators_update_build(mut self, build: u32) -> Self {
        self.creators_update_build = build;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn skus(&self) -> &SkuRegistry {
        &self.skus
    }

    /// First rule, in declaration order, whose version and discriminator match
    pub fn resolve_rule(&self, snapshot: &VersionSnapshot) -> Option<&VersionRule> {
        let found = self
            .rules
            .iter()
            .find(|rule| rule.matches(snapshot, &*self.metrics));
        debug!(
            version = %snapshot.version_string(),
            edition = found.map(|rule| rule.name.as_str()).unwrap_or("<none>"),
            "resolved edition"
        );
        found
    }

    /// Marketing name, or None when the table does not know this version
    pub fn resolve_marketing_name(&self, snapshot: &VersionSnapshot) -> Option<&str> {
        self.resolve_rule(snapshot).map(|rule| rule.name.as_str())
    }

    /// Whether the named edition's own condition holds, regardless of rule order.
    /// Unknown names are false.
    pub fn is_edition(&self, name: &str, snapshot: &VersionSnapshot) -> bool {
        match self.rules.get(name) {
            Some(rule) => rule.matches(snapshot, &*self.metrics),
            None => {
                warn!(edition = name, "no rule with this name");
                false
            }
        }
    }

    /// Every edition whose own condition holds, in declaration order
    pub fn matching_editions(&self, snapshot: &VersionSnapshot) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(snapshot, &*self.metrics))
            .map(|rule| rule.name.as_str())
            .collect()
    }

    pub fn is_server_role(&self, role: ServerRole, snapshot: &VersionSnapshot) -> bool {
        self.skus.has_role(role, snapshot.sku())
    }

    pub fn server_roles(&self, snapshot: &VersionSnapshot) -> Vec<ServerRole> {
        self.skus.roles_for(snapshot.sku())
    }

    /// Windows 10 edition condition and build >= 15063.
    /// False without a warning when the table has no "Windows 10" rule.
    pub fn is_windows10_creators_or_later(&self, snapshot: &VersionSnapshot) -> bool {
        self.rules
            .get(WINDOWS_10)
            .map(|rule| rule.matches(snapshot, &*self.metrics))
            .unwrap_or(false)
            && snapshot.build_number() >= self.creators_update_build
    }

    /// Everything known about one snapshot
    pub fn classify(&self, snapshot: VersionSnapshot) -> Classification {
        Classification {
            marketing_name: self.resolve_marketing_name(&snapshot).map(str::to_string),
            matching_editions: self
                .matching_editions(&snapshot)
                .into_iter()
                .map(str::to_string)
                .collect(),
            server_roles: self.server_roles(&snapshot),
            sku_name: self.skus.name_of(snapshot.sku()),
            windows10_creators_or_later: self.is_windows10_creators_or_later(&snapshot),
            version: snapshot.version_string(),
            service_pack: snapshot.service_pack_label(),
            product_type: snapshot.product_type(),
            classified_at: Utc::now(),
            snapshot,
        }
    }
}

impl Default for EditionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditionClassifier")
            .field("rules", &self.rules.len())
            .field("creators_update_build", &self.creators_update_build)
            .finish_non_exhaustive()
    }
}

/// One classified snapshot
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub marketing_name: Option<String>,
    pub matching_editions: Vec<String>,
    pub server_roles: Vec<ServerRole>,
    pub sku_name: Option<&'static str>,
    pub windows10_creators_or_later: bool,
    pub version: String,
    pub service_pack: Option<String>,
    pub product_type: ProductType,
    pub classified_at: DateTime<Utc>,
    pub snapshot: VersionSnapshot,
}

impl Classification {
    /// Marketing name, or "Unknown Windows version"
    pub fn display_name(&self) -> &str {
        self.marketing_name
            .as_deref()
            .unwrap_or("Unknown Windows version")
    }

    /// e.g. "Windows XP Service Pack 3 (5.1.2600)"
    pub fn summary(&self) -> String {
        match &self.service_pack {
            Some(sp) => format!("{} {} ({})", self.display_name(), sp, self.version),
            None => format!("{} ({})", self.display_name(), self.version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Discriminator;
    use crate::snapshot::{ExtendedVersionInfo, VersionTriple};
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    fn with_captured_warnings(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs.text()
    }

    fn snap(major: u32, minor: u32, build: u32, product_type: ProductType) -> VersionSnapshot {
        VersionSnapshot::new(
            VersionTriple::new(major, minor, build),
            ExtendedVersionInfo::new(product_type),
            0,
        )
    }

    #[test]
    fn test_resolve_windows_10() {
        let classifier = EditionClassifier::new();
        let s = snap(10, 0, 19045, ProductType::Workstation);
        assert_eq!(classifier.resolve_marketing_name(&s), Some("Windows 10"));
    }

    #[test]
    fn test_unknown_name_is_false() {
        let classifier = EditionClassifier::new();
        let s = snap(10, 0, 19045, ProductType::Workstation);
        assert!(!classifier.is_edition("Windows 95", &s));
    }

    #[test]
    fn test_creators_threshold_configurable() {
        let classifier = EditionClassifier::new().with_creators_update_build(16299);
        let s = snap(10, 0, 15063, ProductType::Workstation);
        assert!(!classifier.is_windows10_creators_or_later(&s));
    }

    #[test]
    fn test_creators_check_quiet_without_windows_10_rule() {
        let rules = RuleTable::from_rules(vec![
            VersionRule::new("Windows 11", 10, 0).when(Discriminator::Workstation),
        ])
        .unwrap();
        let classifier = EditionClassifier::with_tables(Arc::new(rules), SkuRegistry::builtin());
        let s = snap(10, 0, 22631, ProductType::Workstation);

        let logs = with_captured_warnings(|| {
            let report = classifier.classify(s);
            assert_eq!(report.marketing_name.as_deref(), Some("Windows 11"));
            assert!(!report.windows10_creators_or_later);
        });
        assert_eq!(logs, "");

        // An explicit lookup of the missing name still warns
        let logs = with_captured_warnings(|| {
            assert!(!classifier.is_edition("Windows 10", &s));
        });
        assert!(logs.contains("no rule with this name"));
    }

    #[test]
    fn test_classification_summary() {
        let classifier = EditionClassifier::new();
        let ext = ExtendedVersionInfo::new(ProductType::Workstation).with_service_pack(3, 0);
        let s = VersionSnapshot::new(VersionTriple::new(5, 1, 2600), ext, 0);
        let report = classifier.classify(s);
        assert_eq!(report.summary(), "Windows XP Service Pack 3 (5.1.2600)");
        assert_eq!(report.matching_editions, vec!["Windows XP".to_string()]);
        assert!(!report.windows10_creators_or_later);

        let report = classifier.classify(snap(99, 0, 1, ProductType::Workstation));
        assert_eq!(report.marketing_name, None);
        assert_eq!(report.summary(), "Unknown Windows version (99.0.1)");
    }
}
